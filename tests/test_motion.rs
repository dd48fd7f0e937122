mod common;

use common::{bordered_grid, parse};
use mazechase::motion::{can_move, step, update_player};
use mazechase::{find_path, Agent, Behavior, CellCoord, Direction, GhostMind, CARDINALS};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

const MAZE: &str = "\
###########
#....#....#
#.##.#.##.#
#.........#
#.##.#.##.#
#....#....#
###.###.###
#.........#
###########
";

#[test]
fn test_random_walk_never_enters_walls() {
    let grid = parse(MAZE);
    let mut rng = StdRng::seed_from_u64(7);

    for &(speed, radius) in &[(1.0_f32, 8.0_f32), (0.3, 8.0), (2.5, 6.0)] {
        let mut agent = Agent::player_at(&grid, CellCoord::new(1, 1), radius, speed);

        for tick in 0..5000 {
            if rng.gen_ratio(1, 20) {
                agent.next_direction = *CARDINALS.choose(&mut rng).unwrap();
            }
            step(&grid, &mut agent);

            assert!(
                !grid.collides_with_wall(agent.x, agent.y, agent.radius),
                "speed {} tick {}: agent at ({}, {}) overlaps a wall",
                speed,
                tick,
                agent.x,
                agent.y
            );
            assert!(agent.x >= agent.radius && agent.x <= grid.world_width() - agent.radius);
            assert!(agent.y >= agent.radius && agent.y <= grid.world_height() - agent.radius);
        }
    }
}

#[test]
fn test_ghost_walk_never_enters_walls() {
    let grid = parse(MAZE);
    let mut rng = StdRng::seed_from_u64(11);
    let mut ghost = Agent::ghost_at(
        &grid,
        CellCoord::new(9, 7),
        GhostMind::new(Behavior::Random, 1.0),
        8.0,
        0.3,
        Direction::Left,
    );

    for _ in 0..5000 {
        if !can_move(&grid, &ghost, ghost.direction) {
            let open: Vec<Direction> = CARDINALS
                .into_iter()
                .filter(|&d| can_move(&grid, &ghost, d))
                .collect();
            ghost.direction = open.choose(&mut rng).copied().unwrap_or(Direction::None);
        }
        step(&grid, &mut ghost);
        assert!(!grid.collides_with_wall(ghost.x, ghost.y, ghost.radius));
    }
}

#[test]
fn test_path_following_reaches_goal() {
    println!("\n=== Follow a path through the maze ===");

    let grid = parse(MAZE);
    let start = CellCoord::new(1, 1);
    let goal = CellCoord::new(9, 7);
    let mut player = Agent::player_at(&grid, start, 8.0, 1.0);
    player.path = find_path(&grid, start, goal);
    assert!(player.path.is_some());

    let mut ticks = 0;
    while player.path.is_some() && ticks < 10_000 {
        update_player(&grid, &mut player);
        assert!(!grid.collides_with_wall(player.x, player.y, player.radius));
        ticks += 1;
    }

    println!("Reached goal after {} ticks", ticks);
    assert!(player.path.is_none(), "path still active after {} ticks", ticks);
    assert_eq!((player.x, player.y), grid.cell_center(goal));
    assert_eq!(player.direction, Direction::None);
}

#[test]
fn test_path_following_visits_cells_in_order() {
    let grid = bordered_grid(10);
    let start = CellCoord::new(1, 1);
    let goal = CellCoord::new(8, 8);
    let mut player = Agent::player_at(&grid, start, 8.0, 1.0);
    let path = find_path(&grid, start, goal).unwrap();
    let expected: Vec<CellCoord> = path.cells().to_vec();
    player.path = Some(path);

    let mut visited = Vec::new();
    let mut last = player.cell(&grid);
    for _ in 0..1000 {
        update_player(&grid, &mut player);
        let cell = player.cell(&grid);
        if cell != last {
            visited.push(cell);
            last = cell;
        }
        if player.path.is_none() {
            break;
        }
    }
    assert_eq!(visited, expected);
}

#[test]
fn test_clamped_to_world_extent() {
    // No border walls: only the clamp keeps the agent inside
    let grid = parse("...\n...\n");
    let mut player = Agent::player_at(&grid, CellCoord::new(0, 0), 8.0, 4.0);

    player.direction = Direction::Left;
    step(&grid, &mut player);
    assert_eq!(player.x, 8.0);

    player.direction = Direction::Up;
    step(&grid, &mut player);
    assert_eq!(player.y, 8.0);

    for _ in 0..50 {
        player.direction = Direction::Right;
        step(&grid, &mut player);
    }
    assert_eq!(player.x, grid.world_width() - 8.0);
}

#[test]
fn test_pending_turn_waits_for_opening() {
    let grid = parse(MAZE);
    let mut player = Agent::player_at(&grid, CellCoord::new(2, 1), 8.0, 4.0);
    player.direction = Direction::Right;
    player.next_direction = Direction::Down;

    // Walls below columns 2 and 3; the turn commits once the box clears column 3
    for _ in 0..30 {
        step(&grid, &mut player);
    }
    assert_eq!(player.direction, Direction::Down);
    assert_eq!(player.x, 90.0);
    assert_eq!(player.cell(&grid).x, 4);
    assert!(player.y > 30.0);
}

#[test]
fn test_off_center_start_aligns_before_turning() {
    let grid = parse(
        "\
##########
#........#
#........#
#........#
#........#
#........#
#..#.....#
#....#...#
#........#
##########
",
    );
    // Just left of centre in (4, 7): going up clips wall (3, 6), and a full
    // step right would clip wall (5, 7), but the short alignment move fits
    let mut player = Agent::player_at(&grid, CellCoord::new(4, 7), 8.59, 4.21);
    player.x = 87.85;
    player.y = 148.97;
    assert!(!grid.collides_with_wall(player.x, player.y, player.radius));

    let goal = CellCoord::new(4, 2);
    player.path = find_path(&grid, player.cell(&grid), goal);
    assert_eq!(player.path.as_ref().map(|p| p.len()), Some(5));

    update_player(&grid, &mut player);
    assert_eq!(player.direction, Direction::Right);
    assert_eq!(player.x, 90.0);

    for _ in 0..200 {
        if player.path.is_none() {
            break;
        }
        update_player(&grid, &mut player);
        assert!(!grid.collides_with_wall(player.x, player.y, player.radius));
    }
    assert!(player.path.is_none(), "stuck at ({}, {})", player.x, player.y);
    assert_eq!((player.x, player.y), grid.cell_center(goal));
}

#[test]
fn test_paths_finish_at_odd_speeds_and_radii() {
    println!("\n=== Path following after free roaming ===");

    let mut rng = StdRng::seed_from_u64(2024);
    let mut followed = 0;

    for round in 0..400 {
        let grid = common::random_grid(10, 0.2, &mut rng);
        let open: Vec<CellCoord> = (0..grid.rows)
            .flat_map(|y| (0..grid.cols).map(move |x| CellCoord::new(x, y)))
            .filter(|&c| grid.is_walkable(c))
            .collect();
        let Some(&start) = open.choose(&mut rng) else {
            continue;
        };

        let speed = rng.gen_range(0.2_f32..9.0);
        let radius = rng.gen_range(4.0_f32..9.9);
        let mut player = Agent::player_at(&grid, start, radius, speed);

        // Roam with arrow input so the path starts off-centre
        for _ in 0..200 {
            if rng.gen_ratio(1, 10) {
                player.next_direction = *CARDINALS.choose(&mut rng).unwrap();
            }
            step(&grid, &mut player);
        }

        let from = player.cell(&grid);
        let Some(&goal) = open.choose(&mut rng) else {
            continue;
        };
        if goal == from {
            continue;
        }
        let Some(path) = find_path(&grid, from, goal) else {
            continue;
        };
        player.path = Some(path);
        player.next_direction = Direction::None;
        followed += 1;

        let mut ticks = 0;
        while player.path.is_some() && ticks < 20_000 {
            update_player(&grid, &mut player);
            assert!(!grid.collides_with_wall(player.x, player.y, player.radius));
            ticks += 1;
        }
        assert!(
            player.path.is_none(),
            "round {}: speed {} radius {} stuck at ({}, {}) heading for {:?}",
            round,
            speed,
            radius,
            player.x,
            player.y,
            goal
        );
        assert_eq!((player.x, player.y), grid.cell_center(goal));
    }

    println!("Followed {} paths", followed);
    assert!(followed > 100);
}
