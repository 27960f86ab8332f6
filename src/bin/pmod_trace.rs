//! Demo: drive PMOD-DA2 frames through a composed board and print the
//! decoded samples.
//!
//! Builds a board with a PMOD-DA2 card on slot 0, pushes a ramp of
//! sample pairs through the 4-bit connector, and also runs a short
//! chip-select/clock-select burst through the SerDes to show the
//! per-slot configuration latching.
//!
//! Usage:
//!   cargo run --bin pmod-trace -- -n 8 --base 0x100
//!   RUST_LOG=trace cargo run --bin pmod-trace

use clap::Parser;
use convboard::board::breakout::{PIN_CLK, PIN_DATA_A, PIN_DATA_B, PIN_SYNC};
use convboard::{Board, BoardIo, ClockConfig, ConverterKind, PmodDac, Simulator, NUM_SLOTS};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of DA2 frames to drive
    #[arg(short = 'n', long, default_value = "8")]
    frames: usize,

    /// First left-channel value of the ramp (right channel is its
    /// 12-bit complement)
    #[arg(long, default_value = "0x100", value_parser = parse_sample)]
    base: u16,
}

fn parse_sample(s: &str) -> Result<u16, String> {
    let value = match s.strip_prefix("0x") {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => s.parse(),
    }
    .map_err(|e| e.to_string())?;
    if value >= 1 << 12 {
        return Err(format!("{value:#x} does not fit in 12 bits"));
    }
    Ok(value)
}

fn pmod_word(clk: bool, sync: bool, data_a: bool, data_b: bool) -> u8 {
    u8::from(clk) << PIN_CLK
        | u8::from(data_b) << PIN_DATA_B
        | u8::from(data_a) << PIN_DATA_A
        | u8::from(sync) << PIN_SYNC
}

/// One connector bit-clock period with the given line levels.
fn pmod_tick(
    sim: &mut Simulator,
    io: &BoardIo,
    sync: bool,
    a: bool,
    b: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    sim.drive_word(io.pmod, pmod_word(false, sync, a, b))?;
    sim.advance(1)?;
    sim.drive_word(io.pmod, pmod_word(true, sync, a, b))?;
    sim.advance(1)?;
    Ok(())
}

/// Drive one well-formed 16-tick DA2 frame plus its closing sync edge.
fn drive_frame(
    sim: &mut Simulator,
    io: &BoardIo,
    left: u16,
    right: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    for k in 0u32..16 {
        let (a, b) = if (4..16).contains(&k) {
            let index = 15 - k;
            (left >> index & 1 == 1, right >> index & 1 == 1)
        } else {
            (false, false)
        };
        pmod_tick(sim, io, false, a, b)?;
    }
    pmod_tick(sim, io, true, false, false)?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let (samples_tx, samples_rx) = crossbeam_channel::unbounded();
    let mut board = Board::new(ClockConfig::default());
    board.attach(Box::new(PmodDac::new(0, samples_tx)), ConverterKind::PmodBreakout)?;
    let (mut sim, io) = board.build()?;

    // Release reset through one bit-clock edge, then run a 1,0,1,0
    // chip-select pattern with ascending clock selects through the
    // SerDes.
    sim.drive(io.reset, true)?;
    serdes_tick(&mut sim, &io)?;
    sim.drive(io.reset, false)?;
    for slot in 0..NUM_SLOTS {
        sim.drive(io.dac_cs, slot % 2 == 0)?;
        sim.drive(io.clksel, slot >= 2)?;
        serdes_tick(&mut sim, &io)?;
    }
    for slot in 0..NUM_SLOTS {
        info!(
            "slot {}: dac_cs={} clksel={} ({})",
            slot,
            u8::from(sim.probe(io.slots[slot].dac_cs)),
            u8::from(sim.probe(io.slots[slot].clksel)),
            if sim.probe(io.slots[slot].clksel) { "domain B" } else { "domain A" },
        );
    }

    // Prime the decoder with a sync-high tick; the fresh decoder emits
    // an all-zero frame on that first rising edge, which we discard.
    pmod_tick(&mut sim, &io, true, false, false)?;
    let _ = samples_rx.try_recv();

    for frame in 0..args.frames {
        let left = (args.base + frame as u16) & 0xfff;
        let right = 0xfff - left;
        drive_frame(&mut sim, &io, left, right)?;
    }

    let mut received = 0usize;
    while let Ok(sample) = samples_rx.try_recv() {
        received += 1;
        info!(
            "frame {:3}: L = 0x{:03x}, R = 0x{:03x} (t={}, dT={})",
            received, sample.left, sample.right, sample.timing.timestamp, sample.timing.delta,
        );
    }
    info!("{} frame(s) decoded, t = {}", received, sim.now());
    Ok(())
}

/// One serial bit-clock period on the SerDes clock line.
fn serdes_tick(sim: &mut Simulator, io: &BoardIo) -> Result<(), Box<dyn std::error::Error>> {
    sim.advance(1)?;
    sim.drive(io.bit_clk, true)?;
    sim.advance(1)?;
    sim.drive(io.bit_clk, false)?;
    Ok(())
}
