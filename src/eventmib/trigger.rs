//! Trigger predicate state machines (§4.4 existence/boolean/threshold
//! tests). Each test type is pure: it consumes a sample (plus whatever
//! per-instance runtime state the caller threads through) and reports which
//! event slots fired. Sampling and event dispatch live in [`super::engine`].

use std::collections::HashMap;
use std::time::Duration;

use crate::oid::Oid;

/// Which configured event slot a test fired, used by the engine to look up
/// the right `(owner, name)` pair to invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireKind {
    /// Existence/boolean tests and the generic threshold path all just say
    /// "the trigger fired"; there is one event per trigger for these.
    Generic,
    /// Threshold test crossed upward into the rising band.
    Rising,
    /// Threshold test crossed downward into the falling band.
    Falling,
}

/// Comparison operators for the boolean test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BooleanOp {
    fn matches(self, sample: i64, operand: i64) -> bool {
        match self {
            BooleanOp::Eq => sample == operand,
            BooleanOp::Ne => sample != operand,
            BooleanOp::Lt => sample < operand,
            BooleanOp::Le => sample <= operand,
            BooleanOp::Gt => sample > operand,
            BooleanOp::Ge => sample >= operand,
        }
    }
}

/// `mteTriggerBooleanComparison` + `mteTriggerBooleanStartup`.
#[derive(Debug, Clone, Copy)]
pub struct BooleanTest {
    pub operator: BooleanOp,
    pub operand: i64,
    /// If set, the implicit pre-first-sample state is `false`, so a
    /// true-valued first sample fires immediately. If unset, the first
    /// sample only establishes a baseline.
    pub startup: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanRuntime {
    initialized: bool,
    prev: bool,
}

impl BooleanTest {
    /// Feed one sample, returning `true` exactly on a false→true edge.
    pub fn step(&self, runtime: &mut BooleanRuntime, sample: i64) -> bool {
        let current = self.operator.matches(sample, self.operand);
        let prev = if !runtime.initialized {
            runtime.initialized = true;
            if self.startup { false } else { current }
        } else {
            runtime.prev
        };
        runtime.prev = current;
        !prev && current
    }
}

/// `mteTriggerExistenceTest` bits.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExistenceTest {
    pub present: bool,
    pub absent: bool,
    pub changed: bool,
    pub startup: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ExistenceRuntime {
    initialized: bool,
    was_present: bool,
}

impl ExistenceTest {
    /// `changed_since_last` is only meaningful when the instance was
    /// present on both this and the previous sample; callers should pass
    /// `false` otherwise.
    pub fn step(
        &self,
        runtime: &mut ExistenceRuntime,
        now_present: bool,
        changed_since_last: bool,
    ) -> bool {
        if !runtime.initialized {
            runtime.initialized = true;
            runtime.was_present = now_present;
            return self.startup && now_present && self.present;
        }

        let fired = (!runtime.was_present && now_present && self.present)
            || (runtime.was_present && !now_present && self.absent)
            || (runtime.was_present && now_present && changed_since_last && self.changed);
        runtime.was_present = now_present;
        fired
    }
}

/// Which edge(s) the threshold test should fire on startup, before any real
/// transition has been observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThresholdStartup {
    #[default]
    None,
    Rising,
    Falling,
    Either,
}

/// `mteTriggerThresholdRising`/`Falling` plus the delta variants.
#[derive(Debug, Clone, Copy)]
pub struct ThresholdTest {
    pub rising: i64,
    pub falling: i64,
    /// Evaluate on sample-to-sample difference instead of the raw sample.
    pub delta: bool,
    pub startup: ThresholdStartup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hysteresis {
    BelowFalling,
    Between,
    AboveRising,
}

#[derive(Debug, Clone, Copy)]
pub struct ThresholdRuntime {
    initialized: bool,
    state: Hysteresis,
    previous_sample: Option<i64>,
}

impl Default for ThresholdRuntime {
    fn default() -> Self {
        Self {
            initialized: false,
            state: Hysteresis::Between,
            previous_sample: None,
        }
    }
}

impl ThresholdTest {
    pub fn step(&self, runtime: &mut ThresholdRuntime, sample: i64) -> Vec<FireKind> {
        let effective = if self.delta {
            let prev = runtime.previous_sample;
            runtime.previous_sample = Some(sample);
            match prev {
                Some(p) => sample - p,
                None => return Vec::new(),
            }
        } else {
            sample
        };

        if !runtime.initialized {
            runtime.initialized = true;
            runtime.state = if effective >= self.rising {
                Hysteresis::AboveRising
            } else if effective <= self.falling {
                Hysteresis::BelowFalling
            } else {
                Hysteresis::Between
            };
            let mut fired = Vec::new();
            if matches!(self.startup, ThresholdStartup::Rising | ThresholdStartup::Either)
                && effective >= self.rising
            {
                fired.push(FireKind::Rising);
            }
            if matches!(self.startup, ThresholdStartup::Falling | ThresholdStartup::Either)
                && effective <= self.falling
            {
                fired.push(FireKind::Falling);
            }
            return fired;
        }

        let mut fired = Vec::new();
        match runtime.state {
            Hysteresis::BelowFalling | Hysteresis::Between => {
                if effective >= self.rising {
                    fired.push(FireKind::Rising);
                    runtime.state = Hysteresis::AboveRising;
                } else if effective <= self.falling {
                    runtime.state = Hysteresis::BelowFalling;
                } else {
                    runtime.state = Hysteresis::Between;
                }
            }
            Hysteresis::AboveRising => {
                if effective <= self.falling {
                    fired.push(FireKind::Falling);
                    runtime.state = Hysteresis::BelowFalling;
                }
            }
        }
        fired
    }
}

/// One of the three predicate kinds a trigger can run.
#[derive(Debug, Clone)]
pub enum TestKind {
    Existence(ExistenceTest),
    Boolean(BooleanTest),
    Threshold(ThresholdTest),
}

/// Per-instance runtime state; wildcarded triggers keep one of these per
/// matched instance suffix.
#[derive(Debug, Clone)]
pub enum TestRuntime {
    Existence(ExistenceRuntime),
    Boolean(BooleanRuntime),
    Threshold(ThresholdRuntime),
}

impl Default for TestRuntime {
    fn default() -> Self {
        TestRuntime::Existence(ExistenceRuntime::default())
    }
}

impl TestKind {
    fn new_runtime(&self) -> TestRuntime {
        match self {
            TestKind::Existence(_) => TestRuntime::Existence(ExistenceRuntime::default()),
            TestKind::Boolean(_) => TestRuntime::Boolean(BooleanRuntime::default()),
            TestKind::Threshold(_) => TestRuntime::Threshold(ThresholdRuntime::default()),
        }
    }
}

/// Row-status discipline shared by triggers, events, and object rows
/// (`RowStatus` per RFC 2579, restricted to the subset Event-MIB rows use).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowStatus {
    #[default]
    CreateAndWait,
    Active,
    NotInService,
    Destroy,
}

/// A configured trigger row (`mteTriggerTable` + its type-specific
/// augmenting tables, folded into one struct for simplicity).
#[derive(Debug, Clone)]
pub struct Trigger {
    pub owner: String,
    pub name: String,
    pub row_status: RowStatus,
    pub enabled: bool,
    pub frequency: Duration,
    pub monitored_oid: Oid,
    /// `true` if `monitored_oid` is a wildcarded prefix to GETNEXT-walk
    /// rather than a single instance to GET.
    pub wildcarded: bool,
    pub delta: bool,
    /// Defaults to sysUpTime when `None` and `delta` is set.
    pub discontinuity_oid: Option<Oid>,
    pub test: TestKind,
    /// Whether this row survives a restart (persisted if `true`).
    pub fixed: bool,
    /// Object list expanded against the matched instance when a
    /// notification fires (`mteTriggerObjectsOwner`/`Objects`).
    pub objects: Vec<Oid>,
    /// `(owner, name)` of the event(s) to fire. Existence/boolean triggers
    /// use only `generic`; threshold triggers use `rising`/`falling`.
    pub generic_event: Option<(String, String)>,
    pub rising_event: Option<(String, String)>,
    pub falling_event: Option<(String, String)>,
}

impl Trigger {
    pub fn event_for(&self, kind: FireKind) -> Option<&(String, String)> {
        match kind {
            FireKind::Generic => self.generic_event.as_ref(),
            FireKind::Rising => self.rising_event.as_ref(),
            FireKind::Falling => self.falling_event.as_ref(),
        }
    }
}

/// Per-matched-instance state for a wildcarded (or singleton) trigger:
/// keyed by the OID suffix past `monitored_oid`.
#[derive(Debug, Clone, Default)]
pub struct InstanceState {
    pub runtime: TestRuntime,
    pub previous_discontinuity: Option<u32>,
    /// Last raw sample seen, used by the existence test's `changed` bit.
    pub previous_existence_value: Option<i64>,
}

/// All instance state for one trigger, keyed by matched suffix (empty for
/// a non-wildcarded trigger).
#[derive(Debug, Clone, Default)]
pub struct TriggerState {
    instances: HashMap<Vec<u32>, InstanceState>,
}

impl TriggerState {
    pub fn instance_mut(&mut self, trigger: &Trigger, suffix: &[u32]) -> &mut InstanceState {
        self.instances
            .entry(suffix.to_vec())
            .or_insert_with(|| InstanceState {
                runtime: trigger.test.new_runtime(),
                previous_discontinuity: None,
                previous_existence_value: None,
            })
    }

    pub fn instances(&self) -> impl Iterator<Item = &Vec<u32>> {
        self.instances.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boolean_fires_once_per_edge() {
        let test = BooleanTest {
            operator: BooleanOp::Eq,
            operand: 5,
            startup: false,
        };
        let mut runtime = BooleanRuntime::default();
        let samples = [3, 5, 5, 4, 5];
        let fired: Vec<bool> = samples.iter().map(|s| test.step(&mut runtime, *s)).collect();
        assert_eq!(fired, vec![false, true, false, false, true]);
        assert_eq!(fired.iter().filter(|f| **f).count(), 2);
    }

    #[test]
    fn test_boolean_startup_fires_on_true_first_sample() {
        let test = BooleanTest {
            operator: BooleanOp::Ge,
            operand: 0,
            startup: true,
        };
        let mut runtime = BooleanRuntime::default();
        assert!(test.step(&mut runtime, 1));
    }

    #[test]
    fn test_threshold_hysteresis_scenario() {
        let test = ThresholdTest {
            rising: 100,
            falling: 50,
            delta: false,
            startup: ThresholdStartup::None,
        };
        let mut runtime = ThresholdRuntime::default();
        let samples = [40, 60, 110, 105, 90, 45, 60, 120];
        let mut rising_at = Vec::new();
        let mut falling_at = Vec::new();
        for (i, s) in samples.iter().enumerate() {
            for kind in test.step(&mut runtime, *s) {
                match kind {
                    FireKind::Rising => rising_at.push(i + 1),
                    FireKind::Falling => falling_at.push(i + 1),
                    FireKind::Generic => unreachable!(),
                }
            }
        }
        assert_eq!(rising_at, vec![3, 8]);
        assert_eq!(falling_at, vec![6]);
    }

    #[test]
    fn test_threshold_startup_can_fire_rising() {
        let test = ThresholdTest {
            rising: 100,
            falling: 50,
            delta: false,
            startup: ThresholdStartup::Either,
        };
        let mut runtime = ThresholdRuntime::default();
        let fired = test.step(&mut runtime, 150);
        assert_eq!(fired, vec![FireKind::Rising]);
    }

    #[test]
    fn test_existence_startup_fires_for_initial_present() {
        let test = ExistenceTest {
            present: true,
            absent: false,
            changed: false,
            startup: true,
        };
        let mut runtime = ExistenceRuntime::default();
        assert!(test.step(&mut runtime, true, false));
    }

    #[test]
    fn test_existence_without_startup_does_not_fire_first_sample() {
        let test = ExistenceTest {
            present: true,
            absent: false,
            changed: false,
            startup: false,
        };
        let mut runtime = ExistenceRuntime::default();
        assert!(!test.step(&mut runtime, true, false));
        assert!(!test.step(&mut runtime, false, false));
        assert!(test.step(&mut runtime, true, false));
    }
}
