use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use pictoforge::grid::Grid;
use pictoforge::optimizer::OptimizationResult;
use pictoforge::scorer::{GridCost, MissingWords};

pub fn print_layout_grid(name: &str, grid: &Grid) {
    println!("\nLayout: {}", name);
    for id in grid.tree().nodes_bfs() {
        let Some(page) = grid.page(id) else {
            continue;
        };
        let parent = grid
            .tree()
            .parent(id)
            .and_then(|p| grid.tree().name(p))
            .map(str::to_string)
            .unwrap_or_else(|| "-".to_string());
        println!(
            "\nPage '{}' (depth {}, parent {})",
            page.name(),
            grid.tree().depth(id).unwrap_or_default(),
            parent
        );

        let mut table = Table::new();
        table.load_preset(ASCII_FULL);
        for r in 0..page.rows() {
            let cells: Vec<Cell> = (0..page.cols())
                .map(|c| match page.get(r * page.cols() + c) {
                    Some(p) if p.is_directory() => Cell::new(format!("> {}", p.link.as_deref().unwrap_or("")))
                        .fg(Color::Cyan)
                        .set_alignment(CellAlignment::Center),
                    Some(p) => Cell::new(&p.word).set_alignment(CellAlignment::Center),
                    None => Cell::new(" "),
                })
                .collect();
            table.add_row(cells);
        }
        println!("{}", table);
    }
}

pub fn print_cost_report(name: &str, grid: &Grid, cost: &GridCost) {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.add_row(vec![
        Cell::new("Layout").add_attribute(Attribute::Bold),
        Cell::new("Pages"),
        Cell::new("Picto"),
        Cell::new("Words"),
        Cell::new("Sent"),
        Cell::new("Distance"),
        Cell::new("Dissim"),
        Cell::new("Total").fg(Color::Cyan),
        Cell::new("Missing").fg(Color::Red),
    ]);
    for i in 1..=8 {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }

    table.add_row(vec![
        Cell::new(name).add_attribute(Attribute::Bold),
        Cell::new(grid.page_count()),
        Cell::new(grid.pictogram_count()),
        Cell::new(grid.word_count()),
        Cell::new(cost.sentences.len()),
        Cell::new(format!("{:.3}", cost.distance)),
        Cell::new(format!("{:.3}", cost.similarity)),
        Cell::new(format!("{:.4}", cost.total)).add_attribute(Attribute::Bold),
        Cell::new(cost.missing.count),
    ]);
    println!("{}", table);

    if let Some((i, worst)) = cost
        .sentences
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
    {
        println!("Most expensive sentence: #{} ({:.3})", i + 1, worst);
    }
}

pub fn print_missing_report(missing: &MissingWords) {
    if missing.is_empty() {
        return;
    }
    println!(
        "\nMissing words: {} occurrence(s), {} distinct",
        missing.count,
        missing.words.len()
    );
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    let words: Vec<&str> = missing.words.iter().map(String::as_str).collect();
    for chunk in words.chunks(8) {
        table.add_row(chunk.iter().map(|w| Cell::new(*w)).collect::<Vec<_>>());
    }
    println!("{}", table);
}

pub fn print_worker_report(result: &OptimizationResult) {
    let mut table = Table::new();
    table.load_preset(ASCII_FULL);
    table.set_header(vec![
        Cell::new("Worker").add_attribute(Attribute::Bold),
        Cell::new("Seed"),
        Cell::new("Gens"),
        Cell::new("Best Cost").fg(Color::Cyan),
    ]);

    for w in &result.workers {
        let cost = Cell::new(format!("{:.4}", w.cost));
        let cost = if w.worker == result.winner {
            cost.fg(Color::Green).add_attribute(Attribute::Bold)
        } else {
            cost
        };
        table.add_row(vec![
            Cell::new(w.worker),
            Cell::new(w.seed.map(|s| s.to_string()).unwrap_or_else(|| "-".into())),
            Cell::new(w.generations),
            cost,
        ]);
    }
    println!("{}", table);
}
