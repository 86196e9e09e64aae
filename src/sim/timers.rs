//! Single-threaded timer wheel
//!
//! Timers count down in whole simulation ticks. When one comes due its
//! event is pushed onto the caller's queue; the tick drains that queue
//! before physics runs, so a timer can never interrupt a tick in progress.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::entity::Species;

/// Work scheduled by a timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerEvent {
    /// Obstacle (swimmer) or hazard (platformer)
    SpawnHazard,
    SpawnPearl,
    SpawnGoldenShell,
    SpawnShield,
    SpawnPlatform,
    SpawnCollectible,
    SpawnBaby,
    SpawnPowerUp,
    /// Parent follows its baby after a delay unless the baby was rescued
    SpawnParent { baby_id: u32, species: Species },
    ShieldExpired,
    SpeedBoostExpired,
    InvincibilityExpired,
    GameOverAnimationDone,
}

impl TimerEvent {
    /// Spawn work must be dropped once the run is over
    pub fn is_spawn(&self) -> bool {
        matches!(
            self,
            TimerEvent::SpawnHazard
                | TimerEvent::SpawnPearl
                | TimerEvent::SpawnGoldenShell
                | TimerEvent::SpawnShield
                | TimerEvent::SpawnPlatform
                | TimerEvent::SpawnCollectible
                | TimerEvent::SpawnBaby
                | TimerEvent::SpawnPowerUp
                | TimerEvent::SpawnParent { .. }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerId(u32);

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Timer {
    id: TimerId,
    event: TimerEvent,
    /// Ticks until the next firing
    remaining: u32,
    /// Repeat period in ticks (`None` = one-shot)
    period: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimerWheel {
    timers: Vec<Timer>,
    next_id: u32,
}

impl TimerWheel {
    pub fn new() -> Self {
        Self::default()
    }

    fn add(&mut self, delay_ticks: u32, period: Option<u32>, event: TimerEvent) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            id,
            event,
            remaining: delay_ticks.max(1),
            period: period.map(|p| p.max(1)),
        });
        id
    }

    /// Arm a repeating timer that first fires after one period
    pub fn every(&mut self, period_ticks: u32, event: TimerEvent) -> TimerId {
        self.add(period_ticks, Some(period_ticks), event)
    }

    /// Arm a one-shot timer
    pub fn after(&mut self, delay_ticks: u32, event: TimerEvent) -> TimerId {
        self.add(delay_ticks, None, event)
    }

    /// Tear down a timer and arm a fresh repeating one with a new period
    pub fn rearm(&mut self, id: TimerId, period_ticks: u32) -> Option<TimerId> {
        let index = self.timers.iter().position(|t| t.id == id)?;
        let old = self.timers.remove(index);
        Some(self.every(period_ticks, old.event))
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() != before
    }

    /// Cancel every timer
    pub fn clear(&mut self) {
        self.timers.clear();
    }

    pub fn is_armed(&self, id: TimerId) -> bool {
        self.timers.iter().any(|t| t.id == id)
    }

    /// Repeat period of an armed timer
    pub fn period(&self, id: TimerId) -> Option<u32> {
        self.timers.iter().find(|t| t.id == id).and_then(|t| t.period)
    }

    /// Ticks until an armed timer next fires
    pub fn remaining(&self, id: TimerId) -> Option<u32> {
        self.timers.iter().find(|t| t.id == id).map(|t| t.remaining)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Advance one tick and queue every event that came due, in arm order
    pub fn advance(&mut self, queue: &mut VecDeque<TimerEvent>) {
        for timer in &mut self.timers {
            timer.remaining = timer.remaining.saturating_sub(1);
            if timer.remaining == 0 {
                queue.push_back(timer.event);
                if let Some(period) = timer.period {
                    timer.remaining = period;
                }
            }
        }
        self.timers.retain(|t| t.remaining > 0);
    }
}
