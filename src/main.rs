use std::error::Error;
use std::path::PathBuf;

use bufmgr::{BufferManager, DiskFile, PageId};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Exercise a buffer pool against a paged file and report what it did
#[derive(Debug, Parser)]
#[command(name = "bufmgr", version)]
struct Args {
    /// Paged file to use; created if it does not exist
    #[arg(short, long)]
    file: PathBuf,

    /// Number of frames in the pool
    #[arg(long, default_value_t = 8)]
    frames: usize,

    /// Number of pages to allocate
    #[arg(long, default_value_t = 32)]
    pages: u32,

    /// Number of fetch/unpin passes over the pages
    #[arg(long, default_value_t = 4)]
    rounds: u32,

    /// Print the frame table before flushing
    #[arg(long)]
    dump: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let file = if args.file.exists() {
        DiskFile::open(&args.file)?
    } else {
        DiskFile::create(&args.file)?
    };

    let mut bm = BufferManager::with_capacity(args.frames)?;
    let id = bm.register_file(file)?;

    // Stamp every new page with its own number
    let mut pages: Vec<PageId> = Vec::with_capacity(args.pages as usize);
    for _ in 0..args.pages {
        let (page_no, page) = bm.allocate_page(id)?;
        bm.page_mut(&page)?.data_mut()[..4].copy_from_slice(&page_no.to_le_bytes());
        bm.release(page, true)?;
        pages.push(page_no);
    }
    info!(count = pages.len(), path = %args.file.display(), "allocated pages");

    // Strided passes so consecutive fetches land far apart; a stride coprime
    // with the page count visits every page once per round
    let stride = coprime_stride(pages.len());
    let mut mismatches = 0usize;
    for round in 0..args.rounds as usize {
        for i in 0..pages.len() {
            let page_no = pages[(round + i * stride) % pages.len()];
            let page = bm.fetch_page(id, page_no)?;
            let data = bm.page(&page)?.data();
            if data[..4] != page_no.to_le_bytes() {
                mismatches += 1;
            }
            bm.release(page, false)?;
        }
    }

    if args.dump {
        println!("{}", bm);
    }

    let stats = bm.stats();
    let mut file = bm.unregister_file(id)?;
    file.sync()?;
    info!(path = %file.path().display(), slots = file.page_slots(), "synced file");

    println!("{}", stats);
    println!("mismatched pages: {}", mismatches);
    if mismatches > 0 {
        return Err(format!("{} pages read back wrong content", mismatches).into());
    }
    Ok(())
}

fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Smallest stride of at least a third of `len` that is coprime with it
fn coprime_stride(len: usize) -> usize {
    let mut stride = (len / 3).max(1);
    while len > 1 && gcd(stride, len) != 1 {
        stride += 1;
    }
    stride
}
