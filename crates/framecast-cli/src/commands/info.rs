use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use framecast_core::io::inspect_npy;

#[derive(Args)]
pub struct InfoArgs {
    /// Input .npy file
    pub file: PathBuf,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let info = inspect_npy(&args.file)?;

    println!("File:        {}", info.path.display());
    println!("Shape:       {:?}", info.shape);
    println!("Frames:      {}", info.frame_count());
    println!("Sample type: {}", info.sample_type);
    match (info.min, info.max) {
        (Some(min), Some(max)) => println!("Range:       {min} .. {max}"),
        _ => println!("Range:       no finite values"),
    }

    Ok(())
}
