//! Scheduler behaviour across whole turns

use std::cell::RefCell;
use std::rc::Rc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use delve::content;
use delve::core::types::{Depth, Direction, EntityId, Position};
use delve::entity::{Behavior, Entity, EntityArena, EntityBuilder, FovMemory, HookContext};
use delve::spatial::{OccupancyRank, PlacementMode, PlacementPolicy};
use delve::topology::{Level, LevelTopology};
use delve::turn::{Intent, TurnEventType, TurnLog, TurnScheduler};
use delve::{Dungeon, DungeonConfig};

#[derive(Debug, Default)]
struct Counts {
    decide: u32,
    update: u32,
    removed: u32,
}

#[derive(Debug, Clone, Copy)]
enum Action {
    Nothing,
    MoveTo(Position),
    ChangeDepth(Depth),
}

/// Records hook calls and performs one scripted action on decide
#[derive(Debug)]
struct Probe {
    counts: Rc<RefCell<Counts>>,
    action: Action,
    touches: Vec<EntityId>,
}

impl Behavior for Probe {
    fn decide(
        &mut self,
        me: &mut Entity,
        _energy: i32,
        _intent: Intent,
        _ctx: &mut HookContext<'_>,
    ) -> Vec<EntityId> {
        self.counts.borrow_mut().decide += 1;
        match self.action {
            Action::Nothing => {}
            Action::MoveTo(pos) => me.position = pos,
            Action::ChangeDepth(depth) => me.depth = depth,
        }
        Vec::new()
    }

    fn update(&mut self, _me: &mut Entity, _ctx: &mut HookContext<'_>) -> Vec<EntityId> {
        self.counts.borrow_mut().update += 1;
        self.touches.clone()
    }

    fn on_removed(&mut self, _me: &mut Entity, _ctx: &mut HookContext<'_>) -> Vec<EntityId> {
        self.counts.borrow_mut().removed += 1;
        Vec::new()
    }
}

fn probe(action: Action, touches: Vec<EntityId>) -> (EntityBuilder, Rc<RefCell<Counts>>) {
    let counts = Rc::new(RefCell::new(Counts::default()));
    let builder = Entity::builder("probe", 'p', OccupancyRank::Creature).behavior(Probe {
        counts: Rc::clone(&counts),
        action,
        touches,
    });
    (builder, counts)
}

fn floor_level(depth: Depth, height: usize, width: usize, entities: &mut EntityArena) -> Level {
    let mut level = Level::new(depth, height, width, ChaCha8Rng::seed_from_u64(depth as u64));
    for row in 0..height as i32 {
        for col in 0..width as i32 {
            let pos = Position::new(row, col);
            let floor = content::floor();
            level
                .spawn(entities, floor, pos, PlacementMode::Overwrite, PlacementPolicy::Exact)
                .unwrap();
        }
    }
    level
}

fn open_dungeon(depths: usize, height: usize, width: usize) -> Dungeon {
    let mut entities = EntityArena::new();
    let levels = (0..depths)
        .map(|d| floor_level(d as Depth, height, width, &mut entities))
        .collect();
    Dungeon::new(entities, LevelTopology::new(levels))
}

fn put(dungeon: &mut Dungeon, builder: EntityBuilder, depth: Depth, pos: Position) -> EntityId {
    dungeon
        .spawn_at(builder, depth, pos, PlacementMode::Append, PlacementPolicy::Exact)
        .unwrap()
}

fn put_wall(dungeon: &mut Dungeon, pos: Position) -> EntityId {
    dungeon
        .spawn_at(content::wall(), 0, pos, PlacementMode::Overwrite, PlacementPolicy::Exact)
        .unwrap()
}

fn has_event(log: &TurnLog, event_type: TurnEventType) -> bool {
    log.events.iter().any(|e| e.event_type == event_type)
}

/// Every entity on a grid is in the cell its index names
fn assert_indices_valid(dungeon: &Dungeon) {
    for entity in dungeon.entities.iter() {
        if let Some(index) = entity.grid_index {
            let level = dungeon.topology.level(index.depth).unwrap();
            assert!(
                level.grid.contains(entity.id, index.position),
                "{} index is stale",
                entity.id
            );
            assert_eq!(entity.position, index.position);
            assert_eq!(entity.depth, index.depth);
        }
    }
}

#[test]
fn test_repushed_entity_decides_once_updates_each_visit() {
    let mut dungeon = open_dungeon(1, 3, 3);
    let (b_builder, b_counts) = probe(Action::Nothing, Vec::new());
    let b = put(&mut dungeon, b_builder, 0, Position::new(2, 2));
    let (p_builder, p_counts) = probe(Action::Nothing, vec![b]);
    let player = put(&mut dungeon, p_builder, 0, Position::new(0, 0));

    let mut scheduler = TurnScheduler::new(player);
    let mut log = TurnLog::new();
    scheduler.advance(&mut dungeon, Intent::Rest, 1, 10, &mut log);

    // The player is seeded and also pushed last, so it is visited twice and
    // re-pushes `b` on each visit
    assert_eq!(p_counts.borrow().decide, 1);
    assert_eq!(p_counts.borrow().update, 2);
    assert_eq!(b_counts.borrow().decide, 1);
    assert_eq!(b_counts.borrow().update, 3);

    // A new turn number lets both decide again
    scheduler.advance(&mut dungeon, Intent::Rest, 2, 10, &mut log);
    assert_eq!(b_counts.borrow().decide, 2);
    assert_eq!(dungeon.entities.get(b).unwrap().last_turn_processed, Some(2));
}

#[test]
fn test_inactive_entity_never_decides_and_is_swept() {
    let mut dungeon = open_dungeon(1, 3, 3);
    let (p_builder, _) = probe(Action::Nothing, Vec::new());
    let player = put(&mut dungeon, p_builder, 0, Position::new(0, 0));
    let (x_builder, x_counts) = probe(Action::Nothing, Vec::new());
    let pos = Position::new(1, 1);
    let x = put(&mut dungeon, x_builder, 0, pos);
    dungeon.entities.get_mut(x).unwrap().mark_removed();

    let mut scheduler = TurnScheduler::new(player);
    let mut log = TurnLog::new();
    scheduler.advance(&mut dungeon, Intent::Rest, 1, 10, &mut log);

    assert_eq!(x_counts.borrow().decide, 0);
    assert_eq!(x_counts.borrow().update, 0);
    assert_eq!(x_counts.borrow().removed, 1);
    assert!(!dungeon.entities.contains(x));

    let level = dungeon.current_level().unwrap();
    assert!(!level.grid.contains(x, pos));
    assert_eq!(level.grid.occupancy_rank(pos), OccupancyRank::Floor);
    assert_eq!(log.removed().collect::<Vec<_>>(), vec![x]);
}

#[test]
fn test_jelly_deaths_cascade_down_the_row() {
    let mut dungeon = open_dungeon(1, 3, 5);
    let (p_builder, _) = probe(Action::Nothing, Vec::new());
    let player = put(&mut dungeon, p_builder, 0, Position::new(0, 0));
    let jellies: Vec<EntityId> = (1..=3)
        .map(|col| put(&mut dungeon, content::jelly(), 0, Position::new(1, col)))
        .collect();

    dungeon.entities.get_mut(jellies[0]).unwrap().take_damage(10);

    let mut scheduler = TurnScheduler::new(player);
    let mut log = TurnLog::new();
    scheduler.advance(&mut dungeon, Intent::Rest, 1, 10, &mut log);

    for jelly in &jellies {
        assert!(!dungeon.entities.contains(*jelly));
    }
    let bursts = log
        .events
        .iter()
        .filter(|e| matches!(e.event_type, TurnEventType::Burst { .. }))
        .count();
    assert_eq!(bursts, 3);
    assert_eq!(log.removed().count(), 3);
    // The probe has no health, so the splash passes it by
    assert!(dungeon.entities.contains(player));
    assert_indices_valid(&dungeon);
}

#[test]
fn test_transfer_lands_on_target_depth() {
    let mut dungeon = open_dungeon(2, 3, 3);
    let (p_builder, _) = probe(Action::Nothing, Vec::new());
    let player = put(&mut dungeon, p_builder, 0, Position::new(0, 0));
    let (t_builder, _) = probe(Action::ChangeDepth(1), Vec::new());
    let pos = Position::new(1, 1);
    let t = put(&mut dungeon, t_builder, 0, pos);

    let mut scheduler = TurnScheduler::new(player);
    let mut log = TurnLog::new();
    scheduler.advance(&mut dungeon, Intent::Rest, 1, 10, &mut log);

    let entity = dungeon.entities.get(t).unwrap();
    assert_eq!(entity.depth, 1);
    assert_eq!(entity.position, pos);
    assert!(dungeon.topology.level(1).unwrap().grid.contains(t, pos));
    assert!(!dungeon.topology.level(0).unwrap().grid.contains(t, pos));
    assert!(log
        .events
        .iter()
        .any(|e| e.event_type == TurnEventType::Transferred { entity: t, from: 0, to: 1 }));
    assert_indices_valid(&dungeon);
}

#[test]
fn test_failed_transfer_leaves_entity_in_place() {
    let mut dungeon = open_dungeon(2, 3, 3);
    // Fill depth 1 with walls so nothing can land there
    for row in 0..3 {
        for col in 0..3 {
            let pos = Position::new(row, col);
            dungeon
                .spawn_at(content::wall(), 1, pos, PlacementMode::Overwrite, PlacementPolicy::Exact)
                .unwrap();
        }
    }
    let (p_builder, _) = probe(Action::Nothing, Vec::new());
    let player = put(&mut dungeon, p_builder, 0, Position::new(0, 0));
    let (t_builder, _) = probe(Action::ChangeDepth(1), Vec::new());
    let pos = Position::new(1, 1);
    let t = put(&mut dungeon, t_builder, 0, pos);
    let (m_builder, _) = probe(Action::ChangeDepth(7), Vec::new());
    let missing = put(&mut dungeon, m_builder, 0, Position::new(2, 2));

    let mut scheduler = TurnScheduler::new(player);
    let mut log = TurnLog::new();
    scheduler.advance(&mut dungeon, Intent::Rest, 1, 10, &mut log);

    let entity = dungeon.entities.get(t).unwrap();
    assert_eq!(entity.depth, 0);
    assert_eq!(entity.position, pos);
    assert!(dungeon.topology.level(0).unwrap().grid.contains(t, pos));
    assert_eq!(dungeon.entities.get(missing).unwrap().depth, 0);

    let failures: Vec<_> = log
        .events
        .iter()
        .filter_map(|e| match &e.event_type {
            TurnEventType::TransferFailed(failure) => Some(failure.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(failures.len(), 2);
    assert!(failures.iter().any(|f| f.entity == t && f.from == 0 && f.to == 1));
    assert!(failures.iter().any(|f| f.entity == missing && f.to == 7));
    assert_indices_valid(&dungeon);
}

#[test]
fn test_move_into_wall_is_rejected() {
    let mut dungeon = open_dungeon(1, 3, 3);
    put_wall(&mut dungeon, Position::new(1, 2));
    let (p_builder, _) = probe(Action::MoveTo(Position::new(1, 2)), Vec::new());
    let player = put(&mut dungeon, p_builder, 0, Position::new(1, 1));

    let mut scheduler = TurnScheduler::new(player);
    let mut log = TurnLog::new();
    scheduler.advance(&mut dungeon, Intent::Rest, 1, 10, &mut log);

    assert_eq!(dungeon.entities.get(player).unwrap().position, Position::new(1, 1));
    assert!(log.events.iter().any(|e| matches!(
        e.event_type,
        TurnEventType::MoveRejected { entity, .. } if entity == player
    )));
    assert_indices_valid(&dungeon);
}

#[test]
fn test_player_descends_stairs() {
    let config = DungeonConfig::default();
    let mut dungeon = open_dungeon(2, 3, 3);
    let pos = Position::new(1, 1);
    put(&mut dungeon, content::stair_down(), 0, pos);
    let player = put(&mut dungeon, content::player(&config), 0, pos);

    let mut scheduler = TurnScheduler::new(player);
    let mut log = TurnLog::new();
    scheduler.step(&mut dungeon, Intent::Descend, 10, &mut log);

    assert_eq!(dungeon.entities.get(player).unwrap().depth, 1);
    assert!(dungeon.swap_depth(player));
    assert_eq!(dungeon.topology.current_depth(), 1);
    assert!(log.events.iter().any(|e| e.description == "You walk down the stairs"));

    // No up stair on the new level
    scheduler.step(&mut dungeon, Intent::Ascend, 10, &mut log);
    assert_eq!(dungeon.entities.get(player).unwrap().depth, 1);
    assert!(!dungeon.swap_depth(player));
    assert!(log.events.iter().any(|e| e.description == "Can't go up here"));
    assert_indices_valid(&dungeon);
}

#[test]
fn test_thrown_dart_hits_first_creature() {
    let config = DungeonConfig::default();
    let mut dungeon = open_dungeon(1, 3, 7);
    let player = put(&mut dungeon, content::player(&config), 0, Position::new(1, 1));
    let newt = put(&mut dungeon, content::newt(), 0, Position::new(1, 5));

    let mut scheduler = TurnScheduler::new(player);
    let mut log = TurnLog::new();
    scheduler.step(&mut dungeon, Intent::Fire(Some(Direction::East)), 10, &mut log);

    let hurt = dungeon.entities.get(newt).unwrap();
    assert_eq!(hurt.health.as_ref().unwrap().current, 1);
    assert_eq!(dungeon.entities.get(player).unwrap().energy, 4);

    let dart = dungeon
        .entities
        .iter()
        .find(|e| e.glyph == ')')
        .expect("dart placed");
    assert_eq!(dart.position, Position::new(1, 5));
    assert!(dart.is_on_grid());

    let path = log
        .events
        .iter()
        .find_map(|e| match &e.event_type {
            TurnEventType::Projectile { path } => Some(path.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(path.first(), Some(&Position::new(1, 1)));
    assert_eq!(path.last(), Some(&Position::new(1, 5)));
    assert_indices_valid(&dungeon);
}

#[test]
fn test_fire_without_target_spends_nothing() {
    let config = DungeonConfig::default();
    let mut dungeon = open_dungeon(1, 3, 3);
    let player = put(&mut dungeon, content::player(&config), 0, Position::new(1, 1));

    let mut scheduler = TurnScheduler::new(player);
    let mut log = TurnLog::new();
    scheduler.step(&mut dungeon, Intent::Fire(None), 10, &mut log);

    assert_eq!(dungeon.entities.get(player).unwrap().energy, 10);
    assert!(log.events.iter().any(|e| e.description == "No targets!"));
}

#[test]
fn test_walking_onto_light_switches_it_on() {
    let config = DungeonConfig::default();
    let mut dungeon = open_dungeon(1, 3, 5);
    let player = put(&mut dungeon, content::player(&config), 0, Position::new(1, 1));
    let lamp = put(&mut dungeon, content::light(), 0, Position::new(1, 2));

    let mut scheduler = TurnScheduler::new(player);
    let mut log = TurnLog::new();
    scheduler.step(&mut dungeon, Intent::Move(Direction::East), 10, &mut log);

    assert_eq!(dungeon.entities.get(player).unwrap().position, Position::new(1, 2));
    assert!(log
        .events
        .iter()
        .any(|e| e.event_type == TurnEventType::Activated { entity: lamp }));

    let lighting = dungeon.current_level().unwrap().lighting();
    assert_eq!(lighting.get(Position::new(0, 3)), Some(&true));
    assert_eq!(lighting.get(Position::new(1, 1)), Some(&true));
    assert_eq!(lighting.get(Position::new(1, 4)), Some(&false));

    let sight = dungeon.entities.get(player).unwrap().sight.clone().unwrap();
    assert!(sight.can_see(Position::new(1, 2)));
    assert_indices_valid(&dungeon);
}

#[test]
fn test_walking_onto_sword_picks_it_up() {
    let config = DungeonConfig::default();
    let mut dungeon = open_dungeon(1, 3, 5);
    let player = put(&mut dungeon, content::player(&config), 0, Position::new(1, 1));
    let sword = put(&mut dungeon, content::sword(), 0, Position::new(1, 2));

    let mut scheduler = TurnScheduler::new(player);
    let mut log = TurnLog::new();
    scheduler.step(&mut dungeon, Intent::Move(Direction::East), 10, &mut log);

    let me = dungeon.entities.get(player).unwrap();
    assert_eq!(me.position, Position::new(1, 2));
    let carried: Vec<&str> = me
        .inventory
        .as_ref()
        .unwrap()
        .contents
        .iter()
        .map(|item| item.name.as_str())
        .collect();
    assert_eq!(carried, vec!["sword", "sword"]);

    // Swept in the same turn it was picked up
    assert!(!dungeon.entities.contains(sword));
    let level = dungeon.current_level().unwrap();
    assert!(!level.grid.contains(sword, Position::new(1, 2)));
    assert!(has_event(&log, TurnEventType::PickedUp { entity: sword, by: player }));
    assert_eq!(log.removed().collect::<Vec<_>>(), vec![sword]);
    assert_indices_valid(&dungeon);
}

#[test]
fn test_equipped_sword_sets_melee_damage() {
    let config = DungeonConfig::default();
    let mut dungeon = open_dungeon(1, 3, 5);
    let player = put(&mut dungeon, content::player(&config), 0, Position::new(1, 1));
    let newt = put(&mut dungeon, content::newt(), 0, Position::new(1, 2));

    let mut scheduler = TurnScheduler::new(player);
    let mut log = TurnLog::new();

    scheduler.step(&mut dungeon, Intent::Equip(0), 10, &mut log);
    let me = dungeon.entities.get(player).unwrap();
    assert_eq!(me.inventory.as_ref().unwrap().equipped, Some(0));
    assert_eq!(me.energy, 5);
    assert!(log.events.iter().any(|e| e.description == "You equip the sword"));

    scheduler.step(&mut dungeon, Intent::Move(Direction::East), 10, &mut log);
    assert!(has_event(&log, TurnEventType::Damaged { entity: newt, amount: 2 }));
    assert_eq!(dungeon.entities.get(newt).unwrap().health.as_ref().unwrap().current, 1);

    // Back to bare fists: one more point finishes it
    scheduler.step(&mut dungeon, Intent::Unequip(0), 10, &mut log);
    assert_eq!(dungeon.entities.get(player).unwrap().attack_damage(), Some(1));
    scheduler.step(&mut dungeon, Intent::Move(Direction::East), 10, &mut log);
    assert!(has_event(&log, TurnEventType::Killed { entity: newt }));
    assert!(!dungeon.entities.contains(newt));

    // The newt bit back with its equipped bite every turn it lived
    assert_eq!(dungeon.entities.get(player).unwrap().health.as_ref().unwrap().current, 3);
    assert_indices_valid(&dungeon);
}

#[test]
fn test_charge_runs_until_a_wall() {
    let config = DungeonConfig::default();
    let mut dungeon = open_dungeon(1, 3, 7);
    put_wall(&mut dungeon, Position::new(1, 5));
    let player = put(&mut dungeon, content::player(&config), 0, Position::new(1, 1));

    let mut scheduler = TurnScheduler::new(player);
    let mut log = TurnLog::new();
    scheduler.step(&mut dungeon, Intent::Charge(Direction::East), 10, &mut log);
    assert_eq!(dungeon.entities.get(player).unwrap().position, Position::new(1, 2));
    assert_eq!(dungeon.entities.get(player).unwrap().energy, 7);

    // Other intents are ignored while the run lasts
    for col in [3, 4] {
        scheduler.step(&mut dungeon, Intent::Move(Direction::West), 10, &mut log);
        let me = dungeon.entities.get(player).unwrap();
        assert_eq!(me.position, Position::new(1, col));
        assert!(me.is_charging());
    }

    // The wall stops the run in place
    scheduler.step(&mut dungeon, Intent::Rest, 10, &mut log);
    let me = dungeon.entities.get(player).unwrap();
    assert_eq!(me.position, Position::new(1, 4));
    assert!(!me.is_charging());

    scheduler.step(&mut dungeon, Intent::Move(Direction::West), 10, &mut log);
    assert_eq!(dungeon.entities.get(player).unwrap().position, Position::new(1, 3));
    assert_indices_valid(&dungeon);
}

#[test]
fn test_charge_adds_distance_to_damage() {
    let config = DungeonConfig::default();
    let mut dungeon = open_dungeon(1, 3, 6);
    let player = put(&mut dungeon, content::player(&config), 0, Position::new(1, 1));
    let jelly = put(&mut dungeon, content::jelly(), 0, Position::new(1, 4));

    let mut scheduler = TurnScheduler::new(player);
    let mut log = TurnLog::new();
    scheduler.step(&mut dungeon, Intent::Charge(Direction::East), 10, &mut log);
    scheduler.step(&mut dungeon, Intent::Rest, 10, &mut log);
    assert_eq!(dungeon.entities.get(player).unwrap().position, Position::new(1, 3));

    // Two cells run plus a one-point punch kills a three-health jelly
    scheduler.step(&mut dungeon, Intent::Rest, 10, &mut log);
    assert!(has_event(&log, TurnEventType::Killed { entity: jelly }));
    assert!(log.events.iter().any(|e| e.description == "the player charges!"));
    assert!(!dungeon.entities.contains(jelly));

    let me = dungeon.entities.get(player).unwrap();
    assert_eq!(me.position, Position::new(1, 3));
    assert!(!me.is_charging());
    // Caught in the splash
    assert_eq!(me.health.as_ref().unwrap().current, 1);
    assert_indices_valid(&dungeon);
}

#[test]
fn test_memory_mode_decides_what_is_kept_out_of_view() {
    for (memory, keeps_jelly) in [(FovMemory::Objects, false), (FovMemory::Everything, true)] {
        let config = DungeonConfig {
            player_sight_radius: 2,
            player_fov_memory: memory,
            ..DungeonConfig::default()
        };
        let mut dungeon = open_dungeon(1, 3, 7);
        let player = put(&mut dungeon, content::player(&config), 0, Position::new(1, 3));
        put(&mut dungeon, content::jelly(), 0, Position::new(2, 2));
        put(&mut dungeon, content::light(), 0, Position::new(0, 2));

        let mut scheduler = TurnScheduler::new(player);
        let mut log = TurnLog::new();
        scheduler.step(&mut dungeon, Intent::Rest, 10, &mut log);
        scheduler.step(&mut dungeon, Intent::Move(Direction::East), 10, &mut log);

        let sight = dungeon.entities.get(player).unwrap().sight.clone().unwrap();
        assert!(sight.can_see(Position::new(1, 3)));
        assert!(!sight.can_see(Position::new(2, 2)));

        let lamp_cell = sight.recall(Position::new(0, 2)).unwrap();
        assert!(lamp_cell.iter().any(|o| o.rank == OccupancyRank::Object));
        assert_eq!(sight.remembers(Position::new(2, 2)), keeps_jelly, "{:?}", memory);
    }
}
