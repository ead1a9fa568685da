use std::{error::Error, io::Read, ptr};

use fitalloc::{BrkHeap, DEFAULT_INCREMENT, HeapConfig, ProgramBreak, Strategy};
use log::{Level, LevelFilter, Log, Metadata, Record};

/// Colored stderr logger for the walkthrough.
struct StderrLogger;

impl Log for StderrLogger {
  fn enabled(
    &self,
    metadata: &Metadata,
  ) -> bool {
    metadata.level() <= log::max_level()
  }

  fn log(
    &self,
    record: &Record,
  ) {
    if !self.enabled(record.metadata()) {
      return;
    }

    let color = match record.level() {
      Level::Error => "\x1b[31m",
      Level::Warn => "\x1b[33m",
      Level::Info => "\x1b[32m",
      Level::Debug => "\x1b[36m",
      Level::Trace => "\x1b[35m",
    };
    eprintln!("{color}[{}]\x1b[0m {}: {}", record.level(), record.target(), record.args());
  }

  fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

/// Waits until the user presses ENTER, when `--pause` was given.
/// Useful to inspect the process with `pmap` or `gdb` between steps.
fn block_until_enter_pressed(pause: bool) {
  if !pause {
    return;
  }
  println!("\n>>> Press ENTER to continue...");
  let _ = std::io::stdin().bytes().next();
}

fn print_state(
  label: &str,
  heap: &BrkHeap,
) {
  println!(
    "[{}] program break = {:?}, grown = {} bytes, {}",
    label,
    unsafe { libc::sbrk(0) },
    heap.grown_size(),
    heap.inspect(),
  );
}

/// Usage: heap [strategy] [ceiling] [increment] [log-level] [--pause]
fn main() -> Result<(), Box<dyn Error>> {
  let mut args: Vec<String> = std::env::args().skip(1).collect();
  let pause = args.iter().any(|arg| arg == "--pause");
  args.retain(|arg| arg != "--pause");

  let strategy: Strategy = args
    .first()
    .map(|s| s.parse::<Strategy>())
    .transpose()?
    .unwrap_or_default();
  let ceiling: usize = args
    .get(1)
    .map(|s| s.parse::<usize>())
    .transpose()?
    .unwrap_or(64 * DEFAULT_INCREMENT);
  let increment: usize = args
    .get(2)
    .map(|s| s.parse::<usize>())
    .transpose()?
    .unwrap_or(DEFAULT_INCREMENT);
  let level: LevelFilter = args
    .get(3)
    .map(|s| s.parse::<LevelFilter>())
    .transpose()?
    .unwrap_or(LevelFilter::Debug);

  log::set_logger(&LOGGER)?;
  log::set_max_level(level);

  // Print once before the heap exists so stdout buffers are already set up
  // and later output does not move the program break under the heap.
  println!(
    "fitalloc walkthrough: {strategy}, ceiling {ceiling} bytes, increment {increment} bytes"
  );

  let mut heap = BrkHeap::with_config(
    ProgramBreak::new(),
    HeapConfig::new()
      .with_strategy(strategy)
      .with_ceiling(ceiling)
      .with_increment(increment),
  );

  print_state("start", &heap);
  block_until_enter_pressed(pause);

  // --------------------------------------------------------------------
  // 1) Allocate space for a u32. The first call grows the heap.
  // --------------------------------------------------------------------
  let first = heap.allocate(4)?;
  unsafe { first.as_ptr().cast::<u32>().write_unaligned(0xDEADBEEF) };
  println!("\n[1] Allocate u32 at {:p}", first);
  print_state("1", &heap);
  block_until_enter_pressed(pause);

  // --------------------------------------------------------------------
  // 2) Allocate a few odd-sized blocks carved from the same growth step.
  // --------------------------------------------------------------------
  let second = heap.allocate(12)?;
  let third = heap.allocate(100)?;
  let fourth = heap.allocate(250)?;
  unsafe { ptr::write_bytes(second.as_ptr(), 0xAB, 12) };
  println!("\n[2] Allocate 12, 100 and 250 bytes at {:p}, {:p}, {:p}", second, third, fourth);
  print_state("2", &heap);
  block_until_enter_pressed(pause);

  // --------------------------------------------------------------------
  // 3) Free two neighbours. They merge into one free chunk.
  // --------------------------------------------------------------------
  unsafe {
    heap.deallocate(third.as_ptr());
    heap.deallocate(second.as_ptr());
  }
  println!("\n[3] Free the 12 and 100 byte blocks");
  for chunk in heap.free_chunks() {
    println!("    free chunk at {:p}: {} bytes", chunk.addr, chunk.size);
  }
  print_state("3", &heap);
  block_until_enter_pressed(pause);

  // --------------------------------------------------------------------
  // 4) Allocate a small block. The placement strategy decides where it goes.
  // --------------------------------------------------------------------
  let fifth = heap.allocate(2)?;
  println!(
    "\n[4] Allocate 2 bytes at {:p} (reused the freed hole? {})",
    fifth,
    if fifth == second { "yes" } else { "no" }
  );
  print_state("4", &heap);
  block_until_enter_pressed(pause);

  // --------------------------------------------------------------------
  // 5) Allocate more than one increment to force several growth steps.
  // --------------------------------------------------------------------
  match heap.allocate(3 * increment) {
    Ok(big) => println!("\n[5] Allocate {} bytes at {:p}", 3 * increment, big),
    Err(err) => println!("\n[5] Allocate {} bytes failed: {err}", 3 * increment),
  }
  print_state("5", &heap);
  block_until_enter_pressed(pause);

  // --------------------------------------------------------------------
  // 6) Reconfigure. Every pointer above is now dangling and the program
  //    break returns to where it was before step 1.
  // --------------------------------------------------------------------
  let value = unsafe { first.as_ptr().cast::<u32>().read_unaligned() };
  println!("\n[6] Value in first block before reset = 0x{:X}", value);
  heap.configure(Strategy::BestFit, ceiling);
  println!("[6] Reconfigured as {}", heap.strategy());
  print_state("6", &heap);

  println!("\n[7] End of example.");
  Ok(())
}
