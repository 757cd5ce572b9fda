use super::{Grid, Pictogram};
use crate::error::{PfResult, PictoForgeError};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::{debug, info};

const COLUMNS: [&str; 8] = [
    "word",
    "row",
    "col",
    "page",
    "identifier",
    "is_directory",
    "link_target",
    "similarity_score",
];

pub fn load_layout<P: AsRef<Path>>(path: P) -> PfResult<Grid> {
    let path = path.as_ref();
    let grid = read_layout(File::open(path)?)?;
    info!(
        "Loaded layout {:?}: {} pages, {} pictograms",
        path,
        grid.page_count(),
        grid.pictogram_count()
    );
    Ok(grid)
}

pub fn save_layout<P: AsRef<Path>>(grid: &Grid, path: P) -> PfResult<()> {
    write_layout(grid, File::create(path.as_ref())?)?;
    info!("Saved layout to {:?}", path.as_ref());
    Ok(())
}

fn layout_error(line: Option<u64>, msg: String) -> PictoForgeError {
    match line {
        Some(l) => PictoForgeError::Layout(format!("line {}: {}", l, msg)),
        None => PictoForgeError::Layout(msg),
    }
}

fn parse_field<T: std::str::FromStr>(value: &str, name: &str, line: Option<u64>) -> PfResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| layout_error(line, format!("invalid {} '{}'", name, value)))
}

fn parse_flag(value: &str, line: Option<u64>) -> PfResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        other => Err(layout_error(line, format!("invalid is_directory '{}'", other))),
    }
}

/// Reads a tab-separated layout.
///
/// The first record carries `root_page_name, page_row_size, page_col_size`;
/// an optional column header follows; each remaining record is one
/// pictogram. A record with empty `word`, `row` and `col` declares a page
/// by name only, which is how pages without pictograms are kept. The
/// hierarchy is rebuilt from directory rows only.
pub fn read_layout<R: Read>(reader: R) -> PfResult<Grid> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut records = rdr.records();
    let meta = records
        .next()
        .ok_or_else(|| layout_error(None, "empty layout file".to_string()))??;
    if meta.len() < 3 {
        return Err(layout_error(
            meta.position().map(|p| p.line()),
            "header must hold root_page_name, page_row_size, page_col_size".to_string(),
        ));
    }
    let meta_line = meta.position().map(|p| p.line());
    let root_name = meta[0].trim().to_string();
    let rows: usize = parse_field(&meta[1], "page_row_size", meta_line)?;
    let cols: usize = parse_field(&meta[2], "page_col_size", meta_line)?;

    let mut pictos = Vec::new();
    let mut declared = Vec::new();
    for result in records {
        let record = result?;
        let line = record.position().map(|p| p.line());
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        if &record[0] == COLUMNS[0] && record.get(1) == Some(COLUMNS[1]) {
            continue;
        }
        if record.len() < 7 {
            return Err(layout_error(
                line,
                format!("expected at least 7 fields, found {}", record.len()),
            ));
        }

        if (0..3).all(|i| record[i].trim().is_empty()) {
            let page = record[3].trim();
            if page.is_empty() {
                return Err(layout_error(
                    line,
                    "page declaration has no page name".to_string(),
                ));
            }
            declared.push(page.to_string());
            continue;
        }

        let word = record[0].trim().to_lowercase();
        let row = parse_field(&record[1], "row", line)?;
        let col = parse_field(&record[2], "col", line)?;
        let page = record[3].trim().to_string();
        let is_directory = parse_flag(&record[5], line)?;
        let link = record[6].trim();
        let similarity = match record.get(7).map(str::trim) {
            Some(s) if !s.is_empty() => Some(parse_field::<f32>(s, "similarity_score", line)?),
            _ => None,
        };

        if is_directory && link.is_empty() {
            return Err(layout_error(
                line,
                format!("directory '{}' has no link_target", word),
            ));
        }

        let mut picto = if is_directory {
            Pictogram::directory(&word, row, col, &page, link)
        } else {
            Pictogram::new(&word, row, col, &page)
        };
        picto.similarity = similarity;
        pictos.push((line, picto));
    }

    build_grid(&root_name, rows, cols, declared, pictos)
}

fn build_grid(
    root_name: &str,
    rows: usize,
    cols: usize,
    declared: Vec<String>,
    pictos: Vec<(Option<u64>, Pictogram)>,
) -> PfResult<Grid> {
    let mut grid = Grid::new(root_name, rows, cols)?;

    // 1. Every page named in the `page` column or declared on its own is defined
    let names = declared
        .iter()
        .map(String::as_str)
        .chain(pictos.iter().map(|(_, p)| p.page.as_str()));
    for name in names {
        if grid.page_id(name).is_none() {
            grid.add_detached_page(name)?;
        }
    }

    // 2. Fill slots
    let mut edges = Vec::new();
    for (line, picto) in pictos {
        let page = grid
            .page_id(&picto.page)
            .ok_or_else(|| layout_error(line, format!("unknown page '{}'", picto.page)))?;
        if let Some(target) = &picto.link {
            edges.push((line, page, target.clone()));
        }
        let word = (!picto.is_directory()).then(|| picto.word.clone());
        grid.page_mut(page)
            .ok_or_else(|| layout_error(line, format!("unknown page '{}'", picto.page)))?
            .place(picto)
            .map_err(|e| layout_error(line, e.to_string()))?;
        if let Some(w) = word {
            grid.index_add(&w, page);
        }
    }

    // 3. Directory rows are the only source of tree edges
    for (line, parent, target) in edges {
        let child = grid.page_id(&target).ok_or_else(|| {
            layout_error(
                line,
                format!("page '{}' is referenced but never defined", target),
            )
        })?;
        grid.tree_mut()
            .insert_child(parent, child)
            .map_err(|e| layout_error(line, e.to_string()))?;
    }

    // 4. No page may float outside the hierarchy
    for (id, page) in grid.pages() {
        if id != grid.root() && grid.tree().parent(id).is_none() {
            return Err(layout_error(
                None,
                format!("page '{}' is not reachable from '{}'", page.name(), root_name),
            ));
        }
    }

    grid.check_consistency()?;
    debug!(
        "Rebuilt hierarchy: {} pages, depth {}",
        grid.page_count(),
        grid.tree()
            .nodes_bfs()
            .iter()
            .filter_map(|&n| grid.tree().depth(n))
            .max()
            .unwrap_or(0)
    );
    Ok(grid)
}

pub fn write_layout<W: Write>(grid: &Grid, writer: W) -> PfResult<()> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_writer(writer);

    wtr.write_record([
        grid.root_name().to_string(),
        grid.rows().to_string(),
        grid.cols().to_string(),
    ])?;
    wtr.write_record(COLUMNS)?;

    for id in grid.tree().nodes_bfs() {
        let Some(page) = grid.page(id) else {
            continue;
        };
        if page.is_empty() {
            wtr.write_record(["", "", "", page.name(), "", "false", "", ""])?;
            continue;
        }
        for (_, p) in page.pictograms() {
            wtr.write_record([
                p.word.clone(),
                p.row.to_string(),
                p.col.to_string(),
                p.page.clone(),
                p.identifier(),
                p.is_directory().to_string(),
                p.link.clone().unwrap_or_default(),
                p.similarity.map(|s| format!("{:.4}", s)).unwrap_or_default(),
            ])?;
        }
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "home\t2\t2\n\
word\trow\tcol\tpage\tidentifier\tis_directory\tlink_target\tsimilarity_score\n\
cat\t0\t0\thome\tcat@home\tfalse\t\t\n\
dog\t0\t1\thome\tdog@home\tfalse\t\t0.5\n\
more\t1\t0\thome\tmore@home\ttrue\tp1\t\n\
mouse\t0\t0\tp1\tmouse@p1\tfalse\t\t\n";

    #[test]
    fn test_reads_hierarchy_from_directory_rows() {
        let g = read_layout(SAMPLE.as_bytes()).unwrap();
        let p1 = g.page_id("p1").unwrap();
        assert_eq!(g.tree().parent(p1), Some(g.root()));
        assert_eq!(g.pages_containing("mouse"), &[p1]);
        let dog = g.locate("dog", 0).unwrap();
        assert_eq!(g.get(dog).unwrap().similarity, Some(0.5));
        assert_eq!(g.page(0).unwrap().directory_to("p1").unwrap().1.word, "more");
    }

    #[test]
    fn test_rejects_undefined_link_target() {
        let broken = "home\t2\t2\ncat\t0\t0\thome\tcat@home\tfalse\t\nmore\t0\t1\thome\tmore@home\ttrue\tghost\n";
        let err = read_layout(broken.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("never defined"), "{}", err);
    }

    #[test]
    fn test_rejects_orphan_page() {
        let broken = "home\t2\t2\ncat\t0\t0\thome\tcat@home\tfalse\t\nrat\t0\t0\tlost\trat@lost\tfalse\t\n";
        let err = read_layout(broken.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("not reachable"), "{}", err);
    }

    #[test]
    fn test_rejects_slot_collision() {
        let broken = "home\t2\t2\ncat\t0\t0\thome\tcat@home\tfalse\t\ndog\t0\t0\thome\tdog@home\tfalse\t\n";
        assert!(read_layout(broken.as_bytes()).is_err());
    }

    #[test]
    fn test_write_then_read_preserves_structure() {
        let g = read_layout(SAMPLE.as_bytes()).unwrap();
        let mut buf = Vec::new();
        write_layout(&g, &mut buf).unwrap();
        let again = read_layout(buf.as_slice()).unwrap();
        assert_eq!(again.page_count(), g.page_count());
        assert_eq!(again.vocabulary(), g.vocabulary());
        let p1 = again.page_id("p1").unwrap();
        assert_eq!(again.tree().parent(p1), Some(again.root()));
    }

    #[test]
    fn test_declared_page_may_hold_nothing() {
        let text = "home\t2\t2\n\
cat\t0\t0\thome\tcat@home\tfalse\t\t\n\
more\t0\t1\thome\tmore@home\ttrue\tp1\t\n\
\t\t\tp1\t\tfalse\t\t\n";
        let g = read_layout(text.as_bytes()).unwrap();
        let p1 = g.page_id("p1").unwrap();
        assert!(g.page(p1).unwrap().is_empty());
        assert_eq!(g.tree().parent(p1), Some(g.root()));

        let nameless = "home\t2\t2\n\t\t\t\t\tfalse\t\n";
        let err = read_layout(nameless.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("no page name"), "{}", err);
    }
}
