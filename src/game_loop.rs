//! Drives one match: gathers decisions, steps the simulation, reacts to its
//! events and decides when the round is over.

use crate::audio::{AudioSink, Sound};
use crate::config::MatchRules;
use crate::policy::{Decision, Policy, View};
use crate::render::{draw_match, Overlay, Surface};
use crate::sim::{Match, Side, StepReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    Playing,
    RoundOver { winner: Option<Side> },
    ExitedToMenu,
}

/// Why a round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// A side reached the winning score
    WinScore(Side),
    /// Any point ends the round
    PointScored(Side),
    HitCap,
    TickBudget,
}

impl Termination {
    pub fn winner(self) -> Option<Side> {
        match self {
            Termination::WinScore(side) | Termination::PointScored(side) => Some(side),
            Termination::HitCap | Termination::TickBudget => None,
        }
    }
}

pub struct MatchController {
    game: Match,
    policies: [Box<dyn Policy>; 2],
    rules: MatchRules,
    phase: Phase,
    ended_by: Option<Termination>,
}

impl MatchController {
    pub fn new(
        game: Match,
        rules: MatchRules,
        left: Box<dyn Policy>,
        right: Box<dyn Policy>,
    ) -> Self {
        Self {
            game,
            policies: [left, right],
            rules,
            phase: Phase::NotStarted,
            ended_by: None,
        }
    }

    pub fn game(&self) -> &Match {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut Match {
        &mut self.game
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn termination(&self) -> Option<Termination> {
        self.ended_by
    }

    pub fn winner(&self) -> Option<Side> {
        match self.phase {
            Phase::RoundOver { winner } => winner,
            _ => None,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.phase == Phase::Playing
    }

    pub fn start(&mut self) {
        match self.phase {
            Phase::NotStarted | Phase::ExitedToMenu => {
                log::debug!("match started");
                self.phase = Phase::Playing;
            }
            phase => log::trace!("start ignored in {:?}", phase),
        }
    }

    /// One tick of play. Outside [`Phase::Playing`] nothing moves and the
    /// report is empty.
    pub fn tick(&mut self, audio: &mut dyn AudioSink) -> StepReport {
        if !self.is_playing() {
            return StepReport::default();
        }

        let decisions: [Decision; 2] = [
            self.policies[0].decide(&View::of(&self.game, Side::Left)),
            self.policies[1].decide(&View::of(&self.game, Side::Right)),
        ];
        let report = self.game.step(decisions);

        let tick = self.game.tick;
        for &event in &report.events {
            audio.play(Sound::for_event(event));
            for policy in &mut self.policies {
                policy.observe(event, tick);
            }
        }

        if let Some(termination) = self.check_termination(&report) {
            log::debug!(
                "round over after {} ticks: {:?}, score {}-{}",
                tick,
                termination,
                self.game.scores[0],
                self.game.scores[1]
            );
            self.ended_by = Some(termination);
            self.phase = Phase::RoundOver {
                winner: termination.winner(),
            };
        }
        report
    }

    fn check_termination(&self, report: &StepReport) -> Option<Termination> {
        if let Some(scorer) = report.scored() {
            if let Some(target) = self.rules.win_score {
                if self.game.score(scorer) >= target {
                    return Some(Termination::WinScore(scorer));
                }
            }
            if self.rules.end_on_score {
                return Some(Termination::PointScored(scorer));
            }
        }
        if let Some(cap) = self.rules.hit_cap {
            if self.game.paddles.iter().any(|paddle| paddle.hits >= cap) {
                return Some(Termination::HitCap);
            }
        }
        if let Some(budget) = self.rules.tick_budget {
            if self.game.tick >= budget {
                return Some(Termination::TickBudget);
            }
        }
        None
    }

    fn reset_round(&mut self) {
        self.game.reset();
        for policy in &mut self.policies {
            policy.reset();
        }
        self.ended_by = None;
    }

    /// From the win screen straight into a fresh round.
    pub fn restart(&mut self) {
        if let Phase::RoundOver { .. } = self.phase {
            self.reset_round();
            self.phase = Phase::Playing;
        } else {
            log::trace!("restart ignored in {:?}", self.phase);
        }
    }

    pub fn exit_to_menu(&mut self) {
        match self.phase {
            Phase::RoundOver { .. } | Phase::Playing => {
                self.reset_round();
                self.phase = Phase::ExitedToMenu;
            }
            phase => log::trace!("exit to menu ignored in {:?}", phase),
        }
    }

    pub fn render(&self, surface: &mut dyn Surface, overlay: &Overlay) {
        draw_match(&self.game, overlay, surface);
        surface.present();
    }

    /// Plays until the round ends, calling `on_tick` after every tick.
    /// The rules must contain at least one reachable end condition.
    pub fn run_headless<F>(&mut self, audio: &mut dyn AudioSink, mut on_tick: F) -> Termination
    where
        F: FnMut(&Match, &StepReport),
    {
        self.start();
        loop {
            let report = self.tick(audio);
            on_tick(&self.game, &report);
            if let Some(termination) = self.ended_by {
                return termination;
            }
        }
    }
}
