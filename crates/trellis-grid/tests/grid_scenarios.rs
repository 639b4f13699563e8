//! End-to-end scenarios driving `DataGrid` through its public surface:
//! schema changes, source binding, sorting, selection, styling, and the
//! signal traffic each of them produces.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use parking_lot::Mutex;

use trellis_core::Signal;
use trellis_grid::{
    CacheState, CellValue, Column, DataGrid, Error, FieldValue, Palette, PropertyPath, RowData,
    RowSource, SortDescriptor, SortIndicator,
};

#[derive(Debug, Clone, PartialEq)]
struct Address {
    city: String,
}

impl RowData for Address {
    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "city" => FieldValue::Value(self.city.clone().into()),
            _ => FieldValue::Absent,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Person {
    name: String,
    age: i64,
    nickname: Option<String>,
    address: Address,
}

impl RowData for Person {
    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "name" => FieldValue::Value(self.name.clone().into()),
            "age" => FieldValue::Value(self.age.into()),
            "nickname" => match &self.nickname {
                Some(nickname) => FieldValue::Value(nickname.clone().into()),
                None => FieldValue::Value(CellValue::Null),
            },
            "address" => FieldValue::Nested(&self.address),
            _ => FieldValue::Absent,
        }
    }
}

fn person(name: &str, age: i64, city: &str) -> Person {
    Person {
        name: name.to_string(),
        age,
        nickname: None,
        address: Address {
            city: city.to_string(),
        },
    }
}

fn path(text: &str) -> PropertyPath {
    PropertyPath::parse(text).unwrap()
}

fn schema() -> Vec<Column> {
    vec![
        Column::new("Name").with_path(path("name")),
        Column::new("Age").with_path(path("age")),
        Column::new("City").with_path(path("address.city")),
        Column::new("Nickname").with_path(path("nickname")),
    ]
}

fn grid_with_source() -> (DataGrid<Person>, Arc<RowSource<Person>>) {
    let grid = DataGrid::new();
    grid.set_columns(schema()).unwrap();
    let source = Arc::new(RowSource::new(vec![
        person("Charlie", 35, "Lisbon"),
        person("Alice", 30, "Oslo"),
        person("Bob", 25, "Porto"),
    ]));
    grid.set_row_source(Some(Arc::clone(&source))).unwrap();
    (grid, source)
}

fn names(grid: &DataGrid<Person>) -> Vec<String> {
    grid.rows().iter().map(|p| p.name.clone()).collect()
}

/// Record every emission of `signal` for later assertions.
fn record<A>(signal: &Signal<A>) -> Arc<Mutex<Vec<A>>>
where
    A: Clone + Send + 'static,
{
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    signal.connect(move |args| sink.lock().push(args.clone()));
    log
}

/// Count every emission of `signal`.
fn count<A>(signal: &Signal<A>) -> Arc<Mutex<usize>>
where
    A: Send + 'static,
{
    let counter = Arc::new(Mutex::new(0));
    let sink = Arc::clone(&counter);
    signal.connect(move |_| *sink.lock() += 1);
    counter
}

#[test]
fn full_pipeline_from_schema_to_selection() {
    let (grid, source) = grid_with_source();
    assert_eq!(grid.cache_state(), CacheState::Materialized);
    assert_eq!(names(&grid), ["Charlie", "Alice", "Bob"]);

    grid.activate_header(0).unwrap();
    assert_eq!(names(&grid), ["Alice", "Bob", "Charlie"]);
    assert_eq!(grid.cache_state(), CacheState::Sorted);

    grid.set_selected(Some(person("Bob", 25, "Porto"))).unwrap();
    assert_eq!(grid.selected().unwrap().name, "Bob");

    // New data flows in; the sort and the selection both survive.
    source.push(person("Aaron", 41, "Reno"));
    assert_eq!(names(&grid), ["Aaron", "Alice", "Bob", "Charlie"]);
    assert_eq!(grid.selected().unwrap().name, "Bob");
    assert_eq!(grid.active_indicator(), Some((0, SortIndicator::Ascending)));
}

#[test]
fn sorting_is_stable_for_equal_keys() {
    #[derive(Debug, Clone, PartialEq)]
    struct Entry {
        group: &'static str,
        value: i64,
    }

    impl RowData for Entry {
        fn field(&self, name: &str) -> FieldValue<'_> {
            match name {
                "group" => FieldValue::Value(self.group.into()),
                "value" => FieldValue::Value(self.value.into()),
                _ => FieldValue::Absent,
            }
        }
    }

    let grid = DataGrid::new();
    grid.set_columns(vec![
        Column::new("Group").with_path(path("group")),
        Column::new("Value").with_path(path("value")),
    ])
    .unwrap();
    grid.set_rows(vec![
        Entry { group: "B", value: 2 },
        Entry { group: "A", value: 2 },
        Entry { group: "A", value: 1 },
    ])
    .unwrap();

    // Equal groups keep their relative source order.
    grid.sort_by(SortDescriptor::ascending(0)).unwrap();
    let observed: Vec<(&str, i64)> = grid.rows().iter().map(|e| (e.group, e.value)).collect();
    assert_eq!(observed, [("A", 2), ("A", 1), ("B", 2)]);

    // Sorting again by the same key changes nothing.
    grid.sort_by(SortDescriptor::ascending(0)).unwrap();
    let again: Vec<(&str, i64)> = grid.rows().iter().map(|e| (e.group, e.value)).collect();
    assert_eq!(again, observed);
}

#[test]
fn missing_values_order_before_present_ones() {
    let (grid, source) = grid_with_source();
    source.push(Person {
        nickname: Some("Chuck".to_string()),
        ..person("Chet", 33, "Kyiv")
    });

    // Only Chet has a nickname; everyone else resolves to null and sorts
    // ahead of him, keeping their source order among themselves.
    grid.sort_by(SortDescriptor::ascending(3)).unwrap();
    assert_eq!(names(&grid), ["Charlie", "Alice", "Bob", "Chet"]);

    grid.sort_by(SortDescriptor::descending(3)).unwrap();
    assert_eq!(names(&grid), ["Chet", "Charlie", "Alice", "Bob"]);
}

#[test]
fn indicator_is_exclusive_across_alternating_sorts() {
    let (grid, _source) = grid_with_source();

    for descriptor in [
        SortDescriptor::ascending(0),
        SortDescriptor::ascending(1),
        SortDescriptor::descending(0),
        SortDescriptor::descending(2),
    ] {
        grid.sort_by(descriptor).unwrap();
        let lit: Vec<usize> = grid
            .columns()
            .iter()
            .enumerate()
            .filter(|(_, c)| c.sort_indicator() != SortIndicator::None)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(lit, [descriptor.column]);
        assert_eq!(
            grid.active_indicator(),
            Some((descriptor.column, descriptor.direction.into()))
        );
    }
}

#[test]
fn reassigning_an_empty_source_empties_the_grid() {
    let (grid, _source) = grid_with_source();
    grid.set_selected(Some(person("Alice", 30, "Oslo"))).unwrap();
    let selections = record(&grid.signals().selection_changed);

    grid.set_row_source(Some(Arc::new(RowSource::empty())))
        .unwrap();
    assert_eq!(grid.cache_state(), CacheState::Materialized);
    assert_eq!(grid.row_count(), 0);

    grid.set_row_source(None).unwrap();
    assert_eq!(grid.cache_state(), CacheState::Empty);

    // Exactly one selection change, when Alice's row vanished.
    let selections = selections.lock();
    assert_eq!(selections.len(), 1);
    assert_eq!(selections[0].previous.as_ref().unwrap().name, "Alice");
    assert_eq!(selections[0].current, None);
}

#[test]
fn selection_follows_cache_membership() {
    let (grid, source) = grid_with_source();
    let selections = record(&grid.signals().selection_changed);

    grid.set_selected(Some(person("Bob", 25, "Porto"))).unwrap();
    source.remove(2); // Bob leaves the source

    let selections = selections.lock();
    assert_eq!(selections.len(), 2);
    assert_eq!(selections[1].previous.as_ref().unwrap().name, "Bob");
    assert_eq!(selections[1].current, None);
    assert_eq!(grid.selected(), None);
}

#[test]
fn selecting_an_absent_row_coerces_to_none() {
    let (grid, _source) = grid_with_source();
    let selections = record(&grid.signals().selection_changed);

    grid.set_selected(Some(person("Nobody", 99, "Nowhere"))).unwrap();
    assert_eq!(grid.selected(), None);
    assert!(selections.lock().is_empty());
}

#[test]
fn disabling_selection_clears_and_rejects() {
    let (grid, _source) = grid_with_source();
    grid.set_selected(Some(person("Alice", 30, "Oslo"))).unwrap();
    let selections = record(&grid.signals().selection_changed);

    grid.set_selection_enabled(false).unwrap();
    assert_eq!(grid.selected(), None);
    assert_eq!(selections.lock().len(), 1);

    assert!(matches!(
        grid.set_selected(Some(person("Alice", 30, "Oslo"))),
        Err(Error::SelectionDisabled)
    ));

    grid.set_selection_enabled(true).unwrap();
    grid.set_selected(Some(person("Alice", 30, "Oslo"))).unwrap();
    assert_eq!(grid.selected().unwrap().name, "Alice");
}

#[test]
fn sort_changed_fires_only_on_actual_change() {
    let (grid, _source) = grid_with_source();
    let changes = record(&grid.signals().sort_changed);

    grid.sort_by(SortDescriptor::ascending(1)).unwrap();
    grid.sort_by(SortDescriptor::ascending(1)).unwrap(); // same descriptor
    grid.sort_by(SortDescriptor::descending(1)).unwrap();
    grid.set_sort(None).unwrap();
    grid.set_sort(None).unwrap(); // already clear

    assert_eq!(
        changes.lock().as_slice(),
        &[
            Some(SortDescriptor::ascending(1)),
            Some(SortDescriptor::descending(1)),
            None,
        ]
    );
}

#[test]
fn schema_replacement_revalidates_the_active_sort() {
    let (grid, _source) = grid_with_source();
    grid.sort_by(SortDescriptor::ascending(1)).unwrap();
    assert_eq!(names(&grid), ["Bob", "Alice", "Charlie"]);
    let changes = record(&grid.signals().sort_changed);

    // Column 1 still exists and is sortable: the sort is kept and the
    // rows stay ordered by it.
    grid.set_columns(schema()).unwrap();
    assert_eq!(grid.sort(), Some(SortDescriptor::ascending(1)));
    assert_eq!(grid.cache_state(), CacheState::Sorted);
    assert_eq!(grid.active_indicator(), Some((1, SortIndicator::Ascending)));
    assert!(changes.lock().is_empty());

    // A single-column schema invalidates descriptor column 1: dropped.
    grid.set_columns(vec![Column::new("Name").with_path(path("name"))])
        .unwrap();
    assert_eq!(grid.sort(), None);
    assert_eq!(grid.cache_state(), CacheState::Materialized);
    assert_eq!(grid.active_indicator(), None);
    assert_eq!(changes.lock().as_slice(), &[None]);
    // The cache keeps the last sorted order.
    assert_eq!(names(&grid), ["Bob", "Alice", "Charlie"]);
}

#[test]
fn header_activation_cycles_direction() {
    let (grid, _source) = grid_with_source();
    let changes = record(&grid.signals().sort_changed);

    grid.activate_header(1).unwrap();
    grid.activate_header(1).unwrap();
    grid.activate_header(0).unwrap();

    assert_eq!(
        changes.lock().as_slice(),
        &[
            Some(SortDescriptor::ascending(1)),
            Some(SortDescriptor::descending(1)),
            Some(SortDescriptor::ascending(0)),
        ]
    );
    assert!(matches!(
        grid.activate_header(9),
        Err(Error::ColumnOutOfRange { index: 9, count: 4 })
    ));
}

#[test]
fn mutating_the_grid_from_a_slot_is_rejected() {
    let (grid, _source) = grid_with_source();
    let result = Arc::new(Mutex::new(None));

    let reentrant = grid.clone();
    let sink = Arc::clone(&result);
    grid.signals().rows_rebuilt.connect(move |_| {
        *sink.lock() = Some(reentrant.set_rows(Vec::new()));
    });

    grid.sort_by(SortDescriptor::ascending(0)).unwrap();
    assert!(matches!(
        result.lock().take(),
        Some(Err(Error::ReentrantMutation))
    ));
    // The rejected call left no trace.
    assert_eq!(grid.row_count(), 3);
    assert_eq!(grid.cache_state(), CacheState::Sorted);
}

#[test]
fn source_mutation_from_a_slot_coalesces_into_one_rebuild() {
    let (grid, source) = grid_with_source();

    let feeder = Arc::clone(&source);
    let fed = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&fed);
    grid.signals().selection_changed.connect(move |_| {
        if !flag.swap(true, Ordering::SeqCst) {
            feeder.push(person("Dana", 28, "Bergen"));
        }
    });

    grid.set_selected(Some(person("Alice", 30, "Oslo"))).unwrap();
    assert_eq!(names(&grid), ["Charlie", "Alice", "Bob", "Dana"]);
    assert_eq!(grid.selected().unwrap().name, "Alice");
}

#[test]
fn concurrent_source_updates_all_land() {
    let (grid, source) = grid_with_source();
    source.clear();

    let workers: Vec<_> = (0..4)
        .map(|worker| {
            let source = Arc::clone(&source);
            thread::spawn(move || {
                for n in 0..25 {
                    source.push(person("Worker", worker * 100 + n, "Here"));
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(source.len(), 100);
    assert_eq!(grid.row_count(), 100);
}

#[test]
fn nested_paths_resolve_through_cells() {
    let (grid, source) = grid_with_source();
    assert_eq!(grid.cell_value(0, 2), Some(CellValue::from("Lisbon")));
    assert_eq!(grid.cell_value(1, 0), Some(CellValue::from("Alice")));

    // Nicknames are all unset, so the cell degrades to null.
    assert_eq!(grid.cell_value(0, 3), Some(CellValue::Null));

    source.update(0, |p| p.address.city = "Faro".to_string());
    assert_eq!(grid.cell_value(0, 2), Some(CellValue::from("Faro")));
}

#[test]
fn style_changes_emit_scoped_rebuilds() {
    let (grid, _source) = grid_with_source();
    let headers = count(&grid.signals().header_rebuilt);
    let rows = count(&grid.signals().rows_rebuilt);

    let zebra = Palette::new(vec![
        trellis_core::Color::WHITE,
        trellis_core::Color::LIGHT_GRAY,
    ])
    .unwrap();
    grid.set_background_palette(zebra).unwrap();
    assert_eq!((*headers.lock(), *rows.lock()), (0, 1));

    grid.set_header_height(48.0).unwrap();
    assert_eq!((*headers.lock(), *rows.lock()), (1, 1));

    // Re-applying the identical style is silent.
    let style = grid.style();
    grid.set_style(style).unwrap();
    assert_eq!((*headers.lock(), *rows.lock()), (1, 1));
}

#[test]
fn refresh_round_trip_with_source_reload() {
    let (grid, source) = grid_with_source();
    let flags = record(&grid.signals().refreshing_changed);
    let requests = count(&grid.signals().refresh_requested);

    grid.request_refresh().unwrap();
    assert!(grid.is_refreshing());
    assert_eq!(*requests.lock(), 1);

    // The host answers the request by replacing the data.
    source.set_rows(vec![person("Fresh", 1, "New")]);
    assert_eq!(names(&grid), ["Fresh"]);

    grid.finish_refresh().unwrap();
    assert!(!grid.is_refreshing());
    assert_eq!(flags.lock().as_slice(), &[true, false]);
}

#[test]
fn blocked_signals_swallow_emissions() {
    let (grid, source) = grid_with_source();
    let rebuilds = count(&grid.signals().rows_rebuilt);

    grid.signals().rows_rebuilt.set_blocked(true);
    source.push(person("Quiet", 1, "Here"));
    assert_eq!(*rebuilds.lock(), 0);
    // The grid still updated; only the notification was suppressed.
    assert_eq!(grid.row_count(), 4);

    grid.signals().rows_rebuilt.set_blocked(false);
    source.push(person("Loud", 2, "Here"));
    assert_eq!(*rebuilds.lock(), 1);
}

#[test]
fn scoped_connections_disconnect_on_drop() {
    let (grid, source) = grid_with_source();
    let observed = Arc::new(Mutex::new(0));

    {
        let sink = Arc::clone(&observed);
        let _guard = grid
            .signals()
            .rows_rebuilt
            .connect_scoped(move |_| *sink.lock() += 1);
        source.push(person("Seen", 1, "Here"));
        assert_eq!(*observed.lock(), 1);
    }

    source.push(person("Unseen", 2, "Here"));
    assert_eq!(*observed.lock(), 1);
    assert_eq!(grid.row_count(), 5);
}
