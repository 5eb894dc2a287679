use bubble_burst::grid::{Grid, Tile};
use bubble_burst::search::{Search, Termination, Traversal};
use bubble_burst::strategy::{SelectionStrategy, Strategy};

fn both_traversals() -> [Traversal; 2] {
    [Traversal::BreadthFirst, Traversal::default()]
}

#[test]
fn single_color_board_is_one_move() {
    let grid = Grid::from_str_rows(&["RRR", "RRR", "RRR"]).unwrap();
    let groups = grid.find_all_groups();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].size(), 9);
    assert_eq!(groups[0].score(), 72);

    for strategy in Strategy::builtins() {
        for traversal in both_traversals() {
            let report = Search::new(&strategy, traversal, 100).run(grid.clone()).unwrap();
            assert_eq!(report.best_score, 72);
            assert_eq!(report.moves.len(), 1);
            assert_eq!(report.moves[0].color, Tile::Red);
            assert_eq!(report.termination, Termination::Exhausted);
            assert_eq!(report.nodes_visited, 2);
            assert!(report.final_grid().is_cleared());
        }
    }
}

#[test]
fn board_without_pairs_terminates_immediately() {
    let grid = Grid::from_str_rows(&["RGB", "GBR", "BRG"]).unwrap();
    assert!(grid.find_all_groups().is_empty());

    for strategy in Strategy::builtins() {
        for traversal in both_traversals() {
            let report = Search::new(&strategy, traversal, 1000).run(grid.clone()).unwrap();
            assert_eq!(report.best_score, 0);
            assert!(report.moves.is_empty());
            assert_eq!(report.nodes_visited, 1);
            assert_eq!(report.frontier_remaining, 0);
            assert_eq!(report.termination, Termination::Exhausted);
        }
    }
}

#[test]
fn burst_left_column_leaves_single_column() {
    // Columns are [R, R] and [B, B].
    let grid = Grid::from_str_rows(&["RB", "RB"]).unwrap();
    let (next, group) = grid.burst((0, 0)).unwrap();
    assert_eq!(group.color(), Tile::Red);
    assert_eq!(next.to_rows(), vec!["B.", "B."]);
    assert_eq!(next.non_empty_count(), 2);
    assert_eq!(grid.to_rows(), vec!["RB", "RB"]);
}

/// 10x10, five-color boards from `Grid::random(10, 10, 5, seed)` with seeds
/// 0, 5, 12 and 13.
const PINNED_BOARDS: [[&str; 10]; 4] = [
    [
        "GRBRPPGRGR",
        "RRRBYRBGRG",
        "BYPRGPPGBY",
        "GRRGGBBRBG",
        "YYRBPBGYPP",
        "GPBYYYYBYY",
        "PGBYPBRYYP",
        "GGPBBYGRRG",
        "RPYPYYPGBG",
        "YRYRYRPPPG",
    ],
    [
        "GYRRYBRPPP",
        "PBYRBGYBRY",
        "BPPRBRBPYG",
        "GBRYBPRPRP",
        "RPPPGBRPRR",
        "YPRRYRGYPY",
        "BGYYYGBYGG",
        "GPYBPRBGPR",
        "YGBRPGYBPB",
        "GGRPGRBBGG",
    ],
    [
        "PYGRYYGRPB",
        "RRYYBYRRGY",
        "RGBBGRYGRR",
        "RGBPRRGPYY",
        "GBPGRBGPPP",
        "GBBGYYRBBB",
        "GRRYBRGPPR",
        "BBYRPGBRGY",
        "BRGRGPPGGP",
        "YBGYPYBBRR",
    ],
    [
        "RRGGRRPPBY",
        "RRBPPBRBYB",
        "YYGBBGYPBB",
        "YYGPGGPRBR",
        "BRPBRBYRYP",
        "BYRRGPYYBR",
        "GPPBGRYRBB",
        "YPRBGRYRGY",
        "RBBRRGRYRB",
        "RRYPRPPRRP",
    ],
];

#[test]
fn priority_not_worse_than_breadth_first_when_budget_runs_out() {
    for (board, rows) in PINNED_BOARDS.iter().enumerate() {
        let grid = Grid::from_str_rows(rows).unwrap();
        for strategy in Strategy::builtins() {
            for budget in [200, 2000] {
                let bfs = Search::new(&strategy, Traversal::BreadthFirst, budget)
                    .run(grid.clone())
                    .unwrap();
                let best_first = Search::new(&strategy, Traversal::default(), budget)
                    .run(grid.clone())
                    .unwrap();
                assert_eq!(bfs.termination, Termination::BudgetSpent);
                assert_eq!(best_first.termination, Termination::BudgetSpent);
                assert_eq!(bfs.nodes_visited, budget);
                assert_eq!(best_first.nodes_visited, budget);
                assert!(
                    best_first.best_score >= bfs.best_score,
                    "board {} {} budget {}: {} < {}",
                    board,
                    strategy,
                    budget,
                    best_first.best_score,
                    bfs.best_score
                );
            }
        }
    }
}

#[test]
fn expand_all_exhaustion_finds_optimum_of_small_board() {
    // Bursting the middle G first merges the two R pairs into one group of 4.
    let grid = Grid::from_str_rows(&["RGR", "RGR"]).unwrap();
    let strategy = Strategy::ExpandAll;
    let report = Search::new(&strategy, Traversal::BreadthFirst, 1000)
        .run(grid)
        .unwrap();
    assert_eq!(report.termination, Termination::Exhausted);
    assert_eq!(report.best_score, 2 + 12);
    assert_eq!(report.moves[0].color, Tile::Green);
}

#[test]
fn budget_of_one_visits_only_the_root() {
    let grid = Grid::random(10, 10, 5, 1).unwrap();
    let strategy = Strategy::default();
    for traversal in both_traversals() {
        let report = Search::new(&strategy, traversal, 1).run(grid.clone()).unwrap();
        assert_eq!(report.nodes_visited, 1);
        assert_eq!(report.best_score, 0);
        assert_eq!(report.termination, Termination::BudgetSpent);
        assert!(report.frontier_remaining <= 3);
    }
}

#[test]
fn custom_strategy_plugs_into_engine() {
    let smallest_first = |_: &Grid, mut groups: Vec<bubble_burst::group::Group>| {
        groups.sort_by_key(|g| g.size());
        groups.truncate(1);
        groups
    };
    let grid = Grid::from_str_rows(&["RRB", "GGB", "GGB"]).unwrap();
    let report = Search::new(&smallest_first, Traversal::BreadthFirst, 100)
        .run(grid)
        .unwrap();
    assert_eq!(report.strategy, smallest_first.name());
    assert_eq!(report.moves[0].color, Tile::Red);
    assert_eq!(report.termination, Termination::Exhausted);
}

#[test]
fn parallel_workers_match_sequential_best_on_exhaustive_search() {
    let grid = Grid::random(4, 3, 3, 2).unwrap();
    let strategy = Strategy::ExpandAll;
    let sequential = Search::new(&strategy, Traversal::default(), 1_000_000)
        .run(grid.clone())
        .unwrap();
    let parallel = Search::new(&strategy, Traversal::default(), 1_000_000)
        .with_workers(4)
        .run(grid)
        .unwrap();
    assert_eq!(parallel.best_score, sequential.best_score);
    assert_eq!(parallel.nodes_visited, sequential.nodes_visited);
}
