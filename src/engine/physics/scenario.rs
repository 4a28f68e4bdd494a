// ABOUTME: Water source/sink scenarios - the per-tick behavior selected before the flow step
// ABOUTME: A tagged sum rather than a class hierarchy; each variant's update lives in solver.rs

/// One of the five source/sink regimes a tick applies before the flow
/// update. Modeled as a plain enum rather than a trait-object hierarchy:
/// there are exactly five of these and they never grow a common virtual
/// surface, so a tagged sum is the simpler and the idiomatic choice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scenario {
    EvenRise,
    Wave,
    Raining,
    Drain,
    Sandbox,
}

impl Scenario {
    /// Parses the numeric scenario id accepted by `setScenario` over FFI
    /// and the CLI/UI layer. Unknown ids are the caller's concern
    /// (`SimError::UnknownScenario`); this just enumerates the valid range.
    pub fn from_id(id: u16) -> Option<Self> {
        match id {
            0 => Some(Scenario::EvenRise),
            1 => Some(Scenario::Wave),
            2 => Some(Scenario::Raining),
            3 => Some(Scenario::Drain),
            4 => Some(Scenario::Sandbox),
            _ => None,
        }
    }

    pub fn id(self) -> u16 {
        match self {
            Scenario::EvenRise => 0,
            Scenario::Wave => 1,
            Scenario::Raining => 2,
            Scenario::Drain => 3,
            Scenario::Sandbox => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Scenario::EvenRise => "even rise",
            Scenario::Wave => "wave",
            Scenario::Raining => "raining",
            Scenario::Drain => "drain",
            Scenario::Sandbox => "sandbox",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Scenario::EvenRise => Scenario::Wave,
            Scenario::Wave => Scenario::Raining,
            Scenario::Raining => Scenario::Drain,
            Scenario::Drain => Scenario::Sandbox,
            Scenario::Sandbox => Scenario::EvenRise,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_round_trips() {
        for id in 0..5u16 {
            let s = Scenario::from_id(id).unwrap();
            assert_eq!(s.id(), id);
        }
    }

    #[test]
    fn unknown_id_is_none() {
        assert!(Scenario::from_id(5).is_none());
    }

    #[test]
    fn next_cycles_back_to_even_rise() {
        let mut s = Scenario::EvenRise;
        for _ in 0..5 {
            s = s.next();
        }
        assert_eq!(s, Scenario::EvenRise);
    }
}
