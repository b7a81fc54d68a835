use std::path::Path;

pub fn run(file: &Path, lib: Option<&Path>) -> Result<(), String> {
    let parse = super::parse_file(file, lib)?;
    println!("{}", parse.output.tree);
    Ok(())
}
