use miette::Result;

pub fn run() -> Result<()> {
    println!("inlay {}", env!("CARGO_PKG_VERSION"));
    Ok(())
}
