use financial_statement_normalizer::*;
use std::error::Error;

fn print_panel(kind: StatementKind, panel: &StatementPanel) {
    println!("\n📄 {}", kind.title());
    let table = match panel {
        StatementPanel::Loaded(table) => table,
        StatementPanel::Failed { message } => {
            println!("   ❌ {}", message);
            return;
        }
    };

    println!(
        "   {:?} layout, {} rows, {}",
        table.shape,
        table.rows.len(),
        table.period_label().unwrap_or_default()
    );
    for row in &table.rows {
        let indent = "  ".repeat(row.indent_level());
        let values: Vec<String> = table
            .years
            .iter()
            .map(|y| format!("{:>16}", format_grouped(row.value(y))))
            .collect();
        println!("   {}{:<48} {}", indent, row.item, values.join(""));
    }
}

fn main() -> std::result::Result<(), Box<dyn Error>> {
    let symbol = std::env::args().nth(1).unwrap_or_else(|| "FPT".to_string());
    let config = DashboardConfig::from_env();
    config.validate()?;

    println!(
        "🔎 Loading statements for {} from {}",
        symbol,
        config.data_dir.display()
    );

    let set = StatementSet::load_from_dir(&config, &symbol);
    for kind in StatementKind::ALL {
        print_panel(kind, set.get(kind));
    }

    println!("\n✅ {} of 3 statements loaded", set.loaded_count());
    Ok(())
}
