//! Actor registry and fixed-tick driver.
//!
//! [`MovementSim`] owns every simulated actor. Hosts feed it input samples as they arrive
//! ([`MovementSim::submit_input`]) and call [`MovementSim::tick`] (or
//! [`MovementSim::tick_parallel`]) once per tick with the static world. Each tick consumes at
//! most one input per actor, oldest first.
//!
//! Design notes
//! - Actors are kept in a `BTreeMap` so iteration, and therefore every tick, is in id order.
//! - The sequential and parallel drivers run the same per-actor step and return identical
//!   snapshots.
//! - A rejected step (non-finite input) leaves that actor's state untouched for the tick.

use std::collections::BTreeMap;

use physics::{ActorInput, ActorState, ObstacleSource, PhysicsConfig, try_step};

use crate::{
    constants::{INPUT_DECAY_TICKS, MAX_PENDING_INPUTS, MAX_TICK_DT_S},
    error::SimError,
};

pub type ActorId = u64;

/// One actor's simulated state and input queue.
#[derive(Clone, Debug)]
pub struct SimActor {
    pub state: ActorState,
    pub config: PhysicsConfig,
    pending: BTreeMap<u64, ActorInput>,
    last_input: ActorInput,
    last_processed_seq: u64,
    idle_ticks: u32,
}

impl SimActor {
    pub fn new(state: ActorState, config: PhysicsConfig) -> Self {
        Self {
            state,
            config,
            pending: BTreeMap::new(),
            last_input: ActorInput::default(),
            last_processed_seq: 0,
            idle_ticks: 0,
        }
    }

    /// Sequence number of the newest input consumed (0 before any).
    #[inline]
    pub fn last_processed_seq(&self) -> u64 {
        self.last_processed_seq
    }

    #[inline]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Queue an input sample.
    ///
    /// Samples may arrive out of order; they are consumed by sequence number. A sample that
    /// repeats a pending sequence number replaces it. When the queue is full the oldest pending
    /// sample is dropped.
    pub fn submit_input(&mut self, input: ActorInput) -> Result<(), SimError> {
        if input.seq == 0 {
            return Err(SimError::InvalidSequence);
        }
        if input.seq <= self.last_processed_seq {
            return Err(SimError::StaleInput {
                seq: input.seq,
                last: self.last_processed_seq,
            });
        }

        self.pending.insert(input.seq, input);
        if self.pending.len() > MAX_PENDING_INPUTS {
            if let Some((dropped, _)) = self.pending.pop_first() {
                log::warn!("Input queue full; dropping input {dropped}");
                self.last_processed_seq = dropped;
            }
        }
        Ok(())
    }

    /// Input to simulate this tick.
    ///
    /// Pops the oldest pending sample. With nothing pending, the last sample is replayed for
    /// [`INPUT_DECAY_TICKS`] ticks and then released.
    pub fn next_input(&mut self) -> ActorInput {
        if let Some((seq, input)) = self.pending.pop_first() {
            self.last_input = input;
            self.last_processed_seq = seq;
            self.idle_ticks = 0;
            return input;
        }

        self.idle_ticks = self.idle_ticks.saturating_add(1);
        if self.idle_ticks <= INPUT_DECAY_TICKS {
            self.last_input
        } else {
            self.last_input.released()
        }
    }

    /// Consume one input and step against `obstacles`.
    pub fn advance<O: ObstacleSource + ?Sized>(
        &mut self,
        obstacles: &O,
        dt: f32,
    ) -> Result<(), SimError> {
        let input = self.next_input();
        self.state = try_step(&self.state, &input, &self.config, obstacles, dt)?;
        Ok(())
    }
}

/// Post-tick view of one actor, ready for replication.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActorSnapshot {
    pub id: ActorId,
    pub state: ActorState,
    /// Newest input reflected in `state`, for client reconciliation.
    pub last_processed_seq: u64,
}

/// Explicit registry of simulated actors.
#[derive(Clone, Debug, Default)]
pub struct MovementSim {
    actors: BTreeMap<ActorId, SimActor>,
    default_config: PhysicsConfig,
    ticks: u64,
}

impl MovementSim {
    /// Registry whose newly spawned actors use `default_config`.
    pub fn new(default_config: PhysicsConfig) -> Result<Self, SimError> {
        default_config.validate()?;
        Ok(Self {
            default_config,
            ..Self::default()
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.actors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    /// Number of ticks run so far.
    #[inline]
    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    pub fn spawn(&mut self, id: ActorId, state: ActorState) -> Result<(), SimError> {
        self.spawn_with_config(id, state, self.default_config)
    }

    pub fn spawn_with_config(
        &mut self,
        id: ActorId,
        state: ActorState,
        config: PhysicsConfig,
    ) -> Result<(), SimError> {
        if self.actors.contains_key(&id) {
            return Err(SimError::DuplicateActor(id));
        }
        if !state.is_finite() {
            return Err(physics::PhysicsError::NonFiniteState.into());
        }
        config.validate()?;
        self.actors.insert(id, SimActor::new(state, config));
        log::debug!("Spawned actor {id}");
        Ok(())
    }

    pub fn despawn(&mut self, id: ActorId) -> Result<SimActor, SimError> {
        let actor = self.actors.remove(&id).ok_or(SimError::UnknownActor(id))?;
        log::debug!("Despawned actor {id}");
        Ok(actor)
    }

    pub fn submit_input(&mut self, id: ActorId, input: ActorInput) -> Result<(), SimError> {
        self.actors
            .get_mut(&id)
            .ok_or(SimError::UnknownActor(id))?
            .submit_input(input)
    }

    pub fn set_config(&mut self, id: ActorId, config: PhysicsConfig) -> Result<(), SimError> {
        config.validate()?;
        self.actors
            .get_mut(&id)
            .ok_or(SimError::UnknownActor(id))?
            .config = config;
        Ok(())
    }

    #[inline]
    pub fn state(&self, id: ActorId) -> Option<&ActorState> {
        self.actors.get(&id).map(|a| &a.state)
    }

    #[inline]
    pub fn actor(&self, id: ActorId) -> Option<&SimActor> {
        self.actors.get(&id)
    }

    /// Run one tick on the calling thread.
    ///
    /// `dt` is clamped to [`MAX_TICK_DT_S`]; a non-positive `dt` consumes no input and only
    /// reports the current states.
    pub fn tick<O: ObstacleSource + ?Sized>(
        &mut self,
        obstacles: &O,
        dt: f32,
    ) -> Vec<ActorSnapshot> {
        let Some(dt) = self.begin_tick(dt) else {
            return self.snapshots();
        };
        self.actors
            .iter_mut()
            .map(|(&id, actor)| advance_one(id, actor, obstacles, dt))
            .collect()
    }

    /// Run one tick with actors split across up to `workers` scoped threads.
    ///
    /// The obstacle source is shared read-only by every worker. Results are identical to
    /// [`MovementSim::tick`].
    pub fn tick_parallel<O: ObstacleSource + Sync + ?Sized>(
        &mut self,
        obstacles: &O,
        dt: f32,
        workers: usize,
    ) -> Vec<ActorSnapshot> {
        let Some(dt) = self.begin_tick(dt) else {
            return self.snapshots();
        };
        let workers = workers.max(1);
        if workers == 1 || self.actors.len() < 2 {
            return self
                .actors
                .iter_mut()
                .map(|(&id, actor)| advance_one(id, actor, obstacles, dt))
                .collect();
        }

        let mut entries: Vec<(ActorId, &mut SimActor)> =
            self.actors.iter_mut().map(|(&id, a)| (id, a)).collect();
        let chunk_len = entries.len().div_ceil(workers);

        let mut snapshots: Vec<ActorSnapshot> = std::thread::scope(|scope| {
            let handles: Vec<_> = entries
                .chunks_mut(chunk_len)
                .map(|chunk| {
                    scope.spawn(move || {
                        chunk
                            .iter_mut()
                            .map(|(id, actor)| advance_one(*id, actor, obstacles, dt))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();

            let mut out = Vec::new();
            for handle in handles {
                match handle.join() {
                    Ok(chunk) => out.extend(chunk),
                    Err(panic) => std::panic::resume_unwind(panic),
                }
            }
            out
        });

        snapshots.sort_by_key(|s| s.id);
        snapshots
    }

    /// Current snapshot of every actor, by id.
    pub fn snapshots(&self) -> Vec<ActorSnapshot> {
        self.actors
            .iter()
            .map(|(&id, actor)| snapshot(id, actor))
            .collect()
    }

    fn begin_tick(&mut self, dt: f32) -> Option<f32> {
        if !(dt > 0.0) {
            return None;
        }
        if !dt.is_finite() {
            log::warn!("Ignoring tick with non-finite dt {dt}");
            return None;
        }
        self.ticks += 1;
        Some(dt.min(MAX_TICK_DT_S))
    }
}

fn advance_one<O: ObstacleSource + ?Sized>(
    id: ActorId,
    actor: &mut SimActor,
    obstacles: &O,
    dt: f32,
) -> ActorSnapshot {
    if let Err(err) = actor.advance(obstacles, dt) {
        log::warn!("Actor {id} skipped this tick: {err}");
    }
    snapshot(id, actor)
}

#[inline]
fn snapshot(id: ActorId, actor: &SimActor) -> ActorSnapshot {
    ActorSnapshot {
        id,
        state: actor.state,
        last_processed_seq: actor.last_processed_seq,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::FIXED_DT_S;
    use physics::{Aabb, Vec3};

    fn floor() -> Vec<Aabb> {
        vec![Aabb::new(
            Vec3::new(-100.0, -1.0, -100.0),
            Vec3::new(100.0, 0.0, 100.0),
        )]
    }

    fn forward(seq: u64) -> ActorInput {
        ActorInput {
            seq,
            forward: true,
            ..Default::default()
        }
    }

    fn grounded(x: f32) -> ActorState {
        ActorState {
            on_ground: true,
            ..ActorState::at(x, 0.0, 0.0)
        }
    }

    #[test]
    fn rejects_zero_and_stale_sequences() {
        let mut actor = SimActor::new(grounded(0.0), PhysicsConfig::defaults());
        assert_eq!(
            actor.submit_input(forward(0)),
            Err(SimError::InvalidSequence)
        );
        actor.submit_input(forward(3)).unwrap();
        assert_eq!(actor.next_input().seq, 3);
        assert_eq!(
            actor.submit_input(forward(2)),
            Err(SimError::StaleInput { seq: 2, last: 3 })
        );
        assert_eq!(
            actor.submit_input(forward(3)),
            Err(SimError::StaleInput { seq: 3, last: 3 })
        );
        assert!(actor.submit_input(forward(4)).is_ok());
    }

    #[test]
    fn out_of_order_inputs_are_consumed_in_sequence() {
        let mut actor = SimActor::new(grounded(0.0), PhysicsConfig::defaults());
        for seq in [5, 2, 9] {
            actor.submit_input(forward(seq)).unwrap();
        }
        let order: Vec<u64> = (0..3).map(|_| actor.next_input().seq).collect();
        assert_eq!(order, vec![2, 5, 9]);
        assert_eq!(actor.last_processed_seq(), 9);
    }

    #[test]
    fn last_input_decays_to_released() {
        let mut actor = SimActor::new(grounded(0.0), PhysicsConfig::defaults());
        let input = ActorInput {
            sprint: true,
            ..forward(1)
        };
        actor.submit_input(input).unwrap();
        assert_eq!(actor.next_input(), input);

        for _ in 0..INPUT_DECAY_TICKS {
            assert!(actor.next_input().forward);
        }
        let decayed = actor.next_input();
        assert!(!decayed.forward);
        assert!(decayed.sprint);
    }

    #[test]
    fn full_queue_drops_oldest() {
        let mut actor = SimActor::new(grounded(0.0), PhysicsConfig::defaults());
        for seq in 1..=(MAX_PENDING_INPUTS as u64 + 1) {
            actor.submit_input(forward(seq)).unwrap();
        }
        assert_eq!(actor.pending_len(), MAX_PENDING_INPUTS);
        assert_eq!(actor.last_processed_seq(), 1);
        assert_eq!(actor.next_input().seq, 2);
    }

    #[test]
    fn registry_lifecycle() {
        let mut sim = MovementSim::new(PhysicsConfig::defaults()).unwrap();
        sim.spawn(1, grounded(0.0)).unwrap();
        assert_eq!(sim.spawn(1, grounded(0.0)), Err(SimError::DuplicateActor(1)));
        assert_eq!(
            sim.submit_input(2, forward(1)),
            Err(SimError::UnknownActor(2))
        );

        let fast = PhysicsConfig {
            speed: 8.0,
            ..PhysicsConfig::defaults()
        };
        sim.set_config(1, fast).unwrap();
        assert_eq!(sim.actor(1).unwrap().config.speed, 8.0);

        let bad = PhysicsConfig {
            height: -1.0,
            ..PhysicsConfig::defaults()
        };
        assert!(matches!(sim.set_config(1, bad), Err(SimError::Physics(_))));

        assert!(sim.despawn(1).is_ok());
        assert!(sim.is_empty());
        assert_eq!(sim.despawn(1).unwrap_err(), SimError::UnknownActor(1));
    }

    #[test]
    fn tick_moves_actors_and_reports_processed_inputs() {
        let mut sim = MovementSim::new(PhysicsConfig::defaults()).unwrap();
        sim.spawn(7, grounded(0.0)).unwrap();
        sim.submit_input(7, forward(1)).unwrap();

        let snaps = sim.tick(&floor(), FIXED_DT_S);
        assert_eq!(snaps.len(), 1);
        assert_eq!(snaps[0].id, 7);
        assert_eq!(snaps[0].last_processed_seq, 1);
        assert!(snaps[0].state.z > 0.0);
        assert!(snaps[0].state.on_ground);
        assert_eq!(sim.tick_count(), 1);
    }

    #[test]
    fn non_positive_dt_consumes_nothing() {
        let mut sim = MovementSim::new(PhysicsConfig::defaults()).unwrap();
        sim.spawn(1, grounded(0.0)).unwrap();
        sim.submit_input(1, forward(1)).unwrap();

        let snaps = sim.tick(&floor(), 0.0);
        assert_eq!(snaps[0].last_processed_seq, 0);
        assert_eq!(sim.actor(1).unwrap().pending_len(), 1);
        assert_eq!(sim.tick_count(), 0);
    }

    #[test]
    fn non_finite_input_leaves_state_untouched() {
        let mut sim = MovementSim::new(PhysicsConfig::defaults()).unwrap();
        sim.spawn(1, grounded(0.0)).unwrap();
        sim.submit_input(
            1,
            ActorInput {
                yaw: f32::NAN,
                ..forward(1)
            },
        )
        .unwrap();

        let snaps = sim.tick(&floor(), FIXED_DT_S);
        assert_eq!(snaps[0].state, grounded(0.0));
        assert_eq!(snaps[0].last_processed_seq, 1);
    }

    #[test]
    fn parallel_tick_matches_sequential() {
        let world = floor();
        let mut a = MovementSim::new(PhysicsConfig::defaults()).unwrap();
        for id in 0..9 {
            a.spawn(id, grounded(id as f32 * 2.0)).unwrap();
        }
        let mut b = a.clone();

        for tick in 1..=10u64 {
            for id in 0..9u64 {
                let input = ActorInput {
                    yaw: (id * 40) as f32,
                    jump: tick % 4 == 0,
                    ..forward(tick)
                };
                a.submit_input(id, input).unwrap();
                b.submit_input(id, input).unwrap();
            }
            let seq = a.tick(&world, FIXED_DT_S);
            let par = b.tick_parallel(&world, FIXED_DT_S, 4);
            assert_eq!(seq, par);
        }
        let ids: Vec<ActorId> = b.snapshots().iter().map(|s| s.id).collect();
        assert_eq!(ids, (0..9).collect::<Vec<_>>());
    }
}
