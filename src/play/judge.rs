use serde::{Deserialize, Serialize};

/// Timing grade of a resolved note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timing {
    Perfect,
    Good,
    Miss,
}

impl Timing {
    /// Points awarded for this grade.
    pub fn points(self) -> u32 {
        match self {
            Timing::Perfect => 100,
            Timing::Good => 50,
            Timing::Miss => 0,
        }
    }

    /// Returns true if this grade breaks combo.
    pub fn is_combo_break(self) -> bool {
        matches!(self, Timing::Miss)
    }
}

/// Timing direction for early/late feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimingDirection {
    Early,
    Exact,
    Late,
}

impl TimingDirection {
    const EXACT_THRESHOLD_MS: f64 = 1.0;

    /// `offset_ms` = input time - note time (negative = early).
    pub fn from_offset(offset_ms: f64) -> Self {
        if offset_ms < -Self::EXACT_THRESHOLD_MS {
            TimingDirection::Early
        } else if offset_ms > Self::EXACT_THRESHOLD_MS {
            TimingDirection::Late
        } else {
            TimingDirection::Exact
        }
    }
}

/// Hit-grade thresholds in milliseconds (inclusive upper bounds).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JudgeWindow {
    pub perfect_ms: f64,
    pub good_ms: f64,
    /// Outer window: an input farther than this matches nothing, and an
    /// unresolved note later than this is missed.
    pub miss_ms: f64,
}

impl JudgeWindow {
    pub fn normal() -> Self {
        Self {
            perfect_ms: 50.0,
            good_ms: 100.0,
            miss_ms: 150.0,
        }
    }

    pub fn builder() -> JudgeWindowBuilder {
        JudgeWindowBuilder::default()
    }

    /// Grade an absolute timing difference. `None` means outside the outer window.
    pub fn judge(&self, diff_ms: f64) -> Option<Timing> {
        let abs_diff = diff_ms.abs();

        if abs_diff <= self.perfect_ms {
            Some(Timing::Perfect)
        } else if abs_diff <= self.good_ms {
            Some(Timing::Good)
        } else if abs_diff <= self.miss_ms {
            Some(Timing::Miss)
        } else {
            None
        }
    }

    pub fn is_in_window(&self, diff_ms: f64) -> bool {
        diff_ms.abs() <= self.miss_ms
    }

    /// `time_until_ms` = note time - now. Exactly `-miss_ms` is still live.
    pub fn is_missed(&self, time_until_ms: f64) -> bool {
        time_until_ms < -self.miss_ms
    }

    /// Thresholds are finite, non-negative and ordered.
    pub fn is_valid(&self) -> bool {
        let all_finite = [self.perfect_ms, self.good_ms, self.miss_ms]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0);
        all_finite && self.perfect_ms <= self.good_ms && self.good_ms <= self.miss_ms
    }
}

impl Default for JudgeWindow {
    fn default() -> Self {
        Self::normal()
    }
}

#[derive(Debug, Default)]
pub struct JudgeWindowBuilder {
    perfect_ms: Option<f64>,
    good_ms: Option<f64>,
    miss_ms: Option<f64>,
}

impl JudgeWindowBuilder {
    pub fn perfect_ms(mut self, ms: f64) -> Self {
        self.perfect_ms = Some(ms);
        self
    }

    pub fn good_ms(mut self, ms: f64) -> Self {
        self.good_ms = Some(ms);
        self
    }

    pub fn miss_ms(mut self, ms: f64) -> Self {
        self.miss_ms = Some(ms);
        self
    }

    pub fn build(self) -> JudgeWindow {
        let default = JudgeWindow::normal();
        JudgeWindow {
            perfect_ms: self.perfect_ms.unwrap_or(default.perfect_ms),
            good_ms: self.good_ms.unwrap_or(default.good_ms),
            miss_ms: self.miss_ms.unwrap_or(default.miss_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_boundaries_are_inclusive() {
        let window = JudgeWindow::normal();
        assert_eq!(window.judge(50.0), Some(Timing::Perfect));
        assert_eq!(window.judge(-50.0), Some(Timing::Perfect));
        assert_eq!(window.judge(50.0001), Some(Timing::Good));
        assert_eq!(window.judge(100.0), Some(Timing::Good));
        assert_eq!(window.judge(100.0001), Some(Timing::Miss));
        assert_eq!(window.judge(150.0), Some(Timing::Miss));
        assert_eq!(window.judge(150.0001), None);
    }

    #[test]
    fn miss_boundary_is_exclusive() {
        let window = JudgeWindow::normal();
        assert!(!window.is_missed(-150.0));
        assert!(window.is_missed(-150.0001));
    }

    #[test]
    fn builder_overrides_only_given_fields() {
        let window = JudgeWindow::builder().perfect_ms(30.0).build();
        assert!((window.perfect_ms - 30.0).abs() < f64::EPSILON);
        assert!((window.good_ms - 100.0).abs() < f64::EPSILON);
        assert!(window.is_valid());
    }

    #[test]
    fn unordered_windows_are_invalid() {
        let window = JudgeWindow::builder().perfect_ms(120.0).build();
        assert!(!window.is_valid());
        let window = JudgeWindow::builder().miss_ms(-1.0).build();
        assert!(!window.is_valid());
    }

    #[test]
    fn timing_direction() {
        assert_eq!(TimingDirection::from_offset(-20.0), TimingDirection::Early);
        assert_eq!(TimingDirection::from_offset(0.5), TimingDirection::Exact);
        assert_eq!(TimingDirection::from_offset(12.0), TimingDirection::Late);
    }
}
