//! Mapping command: inspect the plate code table.

use console::style;

use crate::config::Settings;
use crate::mapping::MappingTable;

pub async fn cmd_mapping(settings: &Settings, plate: Option<&str>) -> anyhow::Result<()> {
    let path = settings.mapping_file.clone();
    let sheets = settings.mapping.sheets.clone();
    let columns = settings.mapping.columns.clone();
    let table =
        tokio::task::spawn_blocking(move || MappingTable::load(&path, &sheets, &columns)).await??;

    match plate {
        Some(plate) => {
            let plate = plate.trim().to_uppercase();
            match table.lookup(&plate) {
                Some(code) => println!("{}({})", plate, code),
                None => {
                    println!("{} No code for {}", style("✗").red(), plate);
                    std::process::exit(1);
                }
            }
        }
        None => println!(
            "{} {} entries loaded from {}",
            style("✓").green(),
            table.len(),
            settings.mapping_file.display()
        ),
    }

    Ok(())
}
