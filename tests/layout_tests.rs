mod common;

use common::{cat_mouse_grid, evaluator, sorted_vocabulary, SENTENCES};
use fastrand::Rng;
use pictoforge::config::{CostWeights, GridParams};
use pictoforge::grid::loader::{load_layout, read_layout, save_layout, write_layout};
use pictoforge::grid::Grid;
use pictoforge::optimizer::mutation::export_word;
use pictoforge::PictoForgeError;
use tempfile::TempDir;

#[test]
fn test_save_and_reload_preserves_cost() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("board.tsv");

    let e = evaluator(SENTENCES, CostWeights::default());
    let params = GridParams {
        row_size: 2,
        col_size: 3,
        ..GridParams::default()
    };
    let grid = Grid::from_vocabulary(&e.corpus.vocabulary(), &params, &mut Rng::with_seed(11)).unwrap();
    save_layout(&grid, &path).unwrap();
    let reloaded = load_layout(&path).unwrap();

    assert_eq!(reloaded.page_count(), grid.page_count());
    assert_eq!(reloaded.pictogram_count(), grid.pictogram_count());
    assert_eq!(sorted_vocabulary(&reloaded), sorted_vocabulary(&grid));
    for (id, page) in grid.pages() {
        let other = reloaded.page_by_name(page.name()).unwrap();
        let parent = grid.tree().parent(id).and_then(|p| grid.tree().name(p));
        let other_parent = reloaded
            .tree()
            .parent(reloaded.page_id(page.name()).unwrap())
            .and_then(|p| reloaded.tree().name(p));
        assert_eq!(parent, other_parent);
        for (slot, p) in page.pictograms() {
            assert_eq!(other.get(slot), Some(p));
        }
    }
    let before = e.fitness(&grid).unwrap();
    let after = e.fitness(&reloaded).unwrap();
    assert!((before - after).abs() < 1e-9);
}

#[test]
fn test_directory_label_survives_reload() {
    let g = cat_mouse_grid();
    let home = g.page(g.root()).unwrap();
    let (slot, dir) = home.directory_to("p1").unwrap();
    assert_eq!(dir.word, "more");
    assert_eq!(home.position_of(slot), (1, 0));
    assert_eq!(g.tree().depth(g.page_id("p1").unwrap()), Some(1));
}

fn layout_err(text: &str) -> String {
    match read_layout(text.as_bytes()) {
        Err(PictoForgeError::Layout(msg)) => msg,
        Err(other) => panic!("expected a layout error, got {}", other),
        Ok(_) => panic!("layout should have been rejected"),
    }
}

#[test]
fn test_orphan_page_is_rejected() {
    let msg = layout_err("home\t2\t2\ncat\t0\t0\thome\tcat@home\tfalse\t\t\nmouse\t0\t0\tlost\tmouse@lost\tfalse\t\t\n");
    assert!(msg.contains("lost"), "{}", msg);
}

#[test]
fn test_directory_without_target_is_rejected() {
    let msg = layout_err("home\t2\t2\nmore\t1\t0\thome\tmore@home\ttrue\t\t\n");
    assert!(msg.contains("link_target"), "{}", msg);
}

#[test]
fn test_undefined_target_is_rejected() {
    let msg = layout_err("home\t2\t2\nmore\t1\t0\thome\tmore@home\ttrue\tnowhere\t\n");
    assert!(msg.contains("nowhere"), "{}", msg);
}

#[test]
fn test_bad_header_is_rejected() {
    assert!(read_layout("home\tx\t2\n".as_bytes()).is_err());
    assert!(read_layout("".as_bytes()).is_err());
}

fn reload(grid: &Grid) -> Grid {
    let mut buf = Vec::new();
    write_layout(grid, &mut buf).unwrap();
    read_layout(buf.as_slice()).unwrap()
}

#[test]
fn test_exporting_last_word_of_a_page_still_reloads() {
    let mut g = cat_mouse_grid();
    let (home, p1) = (g.root(), g.page_id("p1").unwrap());
    assert!(g.export_pictogram("mouse", p1, home));
    assert!(g.page(p1).unwrap().is_empty());
    g.check_consistency().unwrap();

    let again = reload(&g);
    let p1 = again.page_id("p1").unwrap();
    assert!(again.page(p1).unwrap().is_empty());
    assert_eq!(again.tree().parent(p1), Some(again.root()));
    assert_eq!(again.pages_containing("mouse"), &[again.root()]);
    assert_eq!(sorted_vocabulary(&again), sorted_vocabulary(&g));
}

#[test]
fn test_removing_last_word_of_a_page_still_reloads() {
    let mut g = cat_mouse_grid();
    let p1 = g.page_id("p1").unwrap();
    assert!(g.remove_pictogram(p1, "mouse"));

    let again = reload(&g);
    assert_eq!(again.page_count(), g.page_count());
    assert!(again.page_by_name("p1").unwrap().is_empty());
    assert!(!again.contains_word("mouse"));
}

#[test]
fn test_export_mutations_keep_layout_loadable() {
    let e = evaluator(SENTENCES, CostWeights::default());
    let params = GridParams {
        row_size: 2,
        col_size: 3,
        ..GridParams::default()
    };
    let mut rng = Rng::with_seed(3);
    let mut grid = Grid::from_vocabulary(&e.corpus.vocabulary(), &params, &mut rng).unwrap();
    for _ in 0..200 {
        export_word(&mut grid, &mut rng);
    }

    let again = reload(&grid);
    assert_eq!(again.page_count(), grid.page_count());
    assert_eq!(sorted_vocabulary(&again), sorted_vocabulary(&grid));
    let before = e.fitness(&grid).unwrap();
    let after = e.fitness(&again).unwrap();
    assert!((before - after).abs() < 1e-9);
}
