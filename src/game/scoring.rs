use crate::config::SURVIVAL_TICK_MS;

/// What a scoring strategy sees after each entity step.
#[derive(Clone, Copy, Debug)]
pub struct TickContext {
    pub now_ms: u64,
    pub current_score: u32,
    pub consumed_score_boxes: u32,
}

pub trait ScoringStrategy: Send {
    fn name(&self) -> &'static str;

    /// Whether obstacle pairs carry a score box in their gap.
    fn spawns_score_boxes(&self) -> bool;

    fn on_run_start(&mut self, now_ms: u64);

    fn on_tick(&mut self, ctx: &TickContext) -> u32;
}

/// One point per score box the player passes through.
#[derive(Debug, Default)]
pub struct ScoreBoxScoring;

impl ScoringStrategy for ScoreBoxScoring {
    fn name(&self) -> &'static str {
        "score-box"
    }

    fn spawns_score_boxes(&self) -> bool {
        true
    }

    fn on_run_start(&mut self, _now_ms: u64) {}

    fn on_tick(&mut self, ctx: &TickContext) -> u32 {
        ctx.current_score + ctx.consumed_score_boxes
    }
}

/// Time survived since the run started, in `granularity_ms` units.
#[derive(Debug)]
pub struct SurvivalScoring {
    origin_ms: u64,
    granularity_ms: u64,
}

impl SurvivalScoring {
    pub fn new(granularity_ms: u64) -> Self {
        Self {
            origin_ms: 0,
            granularity_ms: granularity_ms.max(1),
        }
    }
}

impl Default for SurvivalScoring {
    fn default() -> Self {
        Self::new(SURVIVAL_TICK_MS)
    }
}

impl ScoringStrategy for SurvivalScoring {
    fn name(&self) -> &'static str {
        "survival"
    }

    fn spawns_score_boxes(&self) -> bool {
        false
    }

    fn on_run_start(&mut self, now_ms: u64) {
        self.origin_ms = now_ms;
    }

    fn on_tick(&mut self, ctx: &TickContext) -> u32 {
        let elapsed = ctx.now_ms.saturating_sub(self.origin_ms);
        u32::try_from(elapsed / self.granularity_ms).unwrap_or(u32::MAX)
    }
}

/// The strategy selected by the `survival-score` feature.
pub fn default_strategy() -> Box<dyn ScoringStrategy> {
    if cfg!(feature = "survival-score") {
        Box::new(SurvivalScoring::default())
    } else {
        Box::new(ScoreBoxScoring)
    }
}
