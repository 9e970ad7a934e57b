// FPGA User Logic Accelerator Driver
// Copyright 2025 Henk-Jan Lebbink
// SPDX-License-Identifier: MIT

//! Basic example walking through deploy and predict against the
//! simulated transport.
//!
//! Run with: `cargo run --example basic`

use userlogic_rs::{AcceleratorConfig, SimOp, SimTransport, UserLogicDriver};

fn main() {
    println!("User Logic Driver Basic Example");
    println!("===============================\n");

    // A simulated accelerator standing in for real hardware: design 47,
    // result register answering 42, two busy polls before completion.
    let mut sim = SimTransport::new(47);
    sim.preload(1, &[42]);
    sim.set_busy_sequence([true, false]);

    let config = AcceleratorConfig::new(47, 4000);
    println!("Expected design ID: {}", config.design_id);
    println!("Bitstream address:  {}", config.bitstream_addr);
    println!("Poll budget:        {} polls\n", config.poll.max_polls);

    let mut driver = UserLogicDriver::new(sim, config);

    // Deploy: configure, settle, verify identity.
    println!("Deploying...");
    match driver.deploy() {
        Ok(status) => println!("  Deploy status: {:?}", status),
        Err(e) => {
            println!("  Deploy failed: {}", e);
            return;
        }
    }
    println!();

    // Predict: one inference over a 6-byte input frame.
    let inputs = [1, -2, 3, -4, 5, -6];
    println!("Predicting with inputs {:?}...", inputs);
    match driver.predict(&inputs, false) {
        Ok(result) => println!("  Result: {}", result),
        Err(e) => println!("  Predict failed: {}", e),
    }
    println!();

    // Streaming predict: chunked input, final chunk carries the answer.
    let frames = [[10, 20, 30, 40, 50, 60], [-1, -2, -3, -4, -5, -6]];
    println!("Streaming {} input frames...", frames.len());
    match driver.predict_stream(&frames) {
        Ok(result) => println!("  Final result: {}", result),
        Err(e) => println!("  Streaming predict failed: {}", e),
    }
    println!();

    // The simulator journals every transport operation.
    println!("Transport operations observed:");
    for op in driver.transport().ops() {
        match op {
            SimOp::Write { addr, data } => println!("  write  {:>3}  {:?}", addr, data),
            SimOp::Read { addr, len } => println!("  read   {:>3}  ({} byte)", addr, len),
            other => println!("  {:?}", other),
        }
    }

    println!("\nDone!");
}
