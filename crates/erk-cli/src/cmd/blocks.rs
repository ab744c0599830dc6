use crate::output::print_json;
use erk_core::scan::scan_all;

/// Print every metadata block found in `text`.
pub fn run(text: &str, kind: Option<&str>, json: bool) -> anyhow::Result<()> {
    let blocks: Vec<_> = scan_all(text)
        .into_iter()
        .filter(|b| kind.map_or(true, |k| b.kind == k))
        .collect();

    if json {
        return print_json(&blocks);
    }
    if blocks.is_empty() {
        println!("No metadata blocks found.");
        return Ok(());
    }
    for (i, block) in blocks.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("[{}]", block.kind);
        print!("{}", serde_yaml::to_string(&block.data)?);
    }
    Ok(())
}
