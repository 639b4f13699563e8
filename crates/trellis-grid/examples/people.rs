//! Trellis Grid walkthrough.
//!
//! Drives a [`DataGrid`] from the console the way a view layer would:
//! binds an observable row source, reacts to grid signals, sorts by
//! header activation, selects rows, and renders the grid as plain text
//! after every rebuild.
//!
//! Run with: cargo run -p trellis-grid --example people
//! Set RUST_LOG=trellis_grid=trace to watch the engine's tracing output.

use std::sync::Arc;

use trellis_grid::{
    CellValue, Column, ColumnWidth, DataGrid, FieldValue, PropertyPath, RowData, RowSource,
    SortDescriptor, SortIndicator,
};

#[derive(Debug, Clone, PartialEq)]
struct Address {
    city: &'static str,
    country: &'static str,
}

impl RowData for Address {
    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "city" => FieldValue::Value(self.city.into()),
            "country" => FieldValue::Value(self.country.into()),
            _ => FieldValue::Absent,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Person {
    name: &'static str,
    age: i64,
    address: Address,
}

impl RowData for Person {
    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "name" => FieldValue::Value(self.name.into()),
            "age" => FieldValue::Value(self.age.into()),
            "address" => FieldValue::Nested(&self.address),
            _ => FieldValue::Absent,
        }
    }
}

fn person(name: &'static str, age: i64, city: &'static str, country: &'static str) -> Person {
    Person {
        name,
        age,
        address: Address { city, country },
    }
}

/// Render the grid as a fixed-width text table, the console stand-in for
/// a row view rebind.
fn render(grid: &DataGrid<Person>) {
    let columns = grid.columns();
    if columns.is_empty() {
        println!("  (no columns)");
        return;
    }

    let mut header = String::from(" ");
    for column in &columns {
        let marker = match column.sort_indicator() {
            SortIndicator::Ascending => " ^",
            SortIndicator::Descending => " v",
            SortIndicator::None => "",
        };
        header.push_str(&format!(" {:<14}", format!("{}{marker}", column.title())));
    }
    println!("{header}");

    let active = grid.selected();
    for row in 0..grid.row_count() {
        let selected = active.is_some() && grid.row(row) == active;
        let mut line = String::from(if selected { ">" } else { " " });
        for column in 0..columns.len() {
            let text = grid
                .cell_value(row, column)
                .unwrap_or(CellValue::Null)
                .to_string();
            line.push_str(&format!(" {text:<14}"));
        }
        println!("{line}");
    }
    println!();
}

fn main() -> trellis_grid::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let grid: DataGrid<Person> = DataGrid::new();

    let renderer = grid.clone();
    grid.signals().rows_rebuilt.connect(move |_| {
        println!("[rows rebuilt]");
        render(&renderer);
    });
    grid.signals().sort_changed.connect(|descriptor| {
        println!("[sort changed: {descriptor:?}]");
    });
    grid.signals().selection_changed.connect(|change| {
        let name = |p: &Option<Person>| p.as_ref().map_or("-", |p| p.name);
        println!(
            "[selection: {} -> {}]",
            name(&change.previous),
            name(&change.current)
        );
    });
    grid.signals().refresh_requested.connect(|_| {
        println!("[refresh requested]");
    });

    println!("== schema and source ==");
    grid.set_columns(vec![
        Column::new("Name").with_path(PropertyPath::parse("name")?),
        Column::new("Age")
            .with_path(PropertyPath::parse("age")?)
            .with_width(ColumnWidth::Fixed(60.0)),
        Column::new("City").with_path(PropertyPath::parse("address.city")?),
        Column::new("Country")
            .with_path(PropertyPath::parse("address.country")?)
            .with_sorting(false),
    ])?;

    let source = Arc::new(RowSource::new(vec![
        person("Charlie", 35, "Lisbon", "Portugal"),
        person("Alice", 30, "Oslo", "Norway"),
        person("Bob", 25, "Porto", "Portugal"),
    ]));
    grid.set_row_source(Some(Arc::clone(&source)))?;

    println!("== header activation: Name ascending, then descending ==");
    grid.activate_header(0)?;
    grid.activate_header(0)?;

    println!("== programmatic sort: Age ascending ==");
    grid.sort_by(SortDescriptor::ascending(1))?;

    println!("== select Alice ==");
    grid.set_selected(Some(person("Alice", 30, "Oslo", "Norway")))?;

    println!("== the source changes under the grid ==");
    source.push(person("Dana", 28, "Bergen", "Norway"));

    println!("== pull-to-refresh round trip ==");
    grid.request_refresh()?;
    source.update(0, |p| p.age += 1);
    grid.finish_refresh()?;

    println!("== activating the unsortable Country column is a no-op ==");
    grid.activate_header(3)?;

    println!("done: {} rows, sorted by {:?}", grid.row_count(), grid.sort());
    Ok(())
}
