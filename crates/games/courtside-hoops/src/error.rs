use courtside_core::game_trait::HoopSide;

/// Invalid setup detected while building the simulation.
#[derive(Debug, Clone, PartialEq)]
pub enum SetupError {
    MissingRim(HoopSide),
    InvalidRadius { what: &'static str, value: f32 },
    InvalidTimestep(f32),
}

impl std::fmt::Display for SetupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingRim(side) => write!(f, "no rim position for the {} hoop", side.as_str()),
            Self::InvalidRadius { what, value } => {
                write!(f, "{what} radius must be positive, got {value}")
            },
            Self::InvalidTimestep(dt) => {
                write!(f, "timestep must be positive and finite, got {dt}")
            },
        }
    }
}

impl std::error::Error for SetupError {}

/// Why the shot solver could not produce a launch velocity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrajectoryError {
    NonFiniteInput,
    NonPositiveArc(f32),
    InvalidFlightTime(f32),
}

impl std::fmt::Display for TrajectoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonFiniteInput => write!(f, "shot input is not finite"),
            Self::NonPositiveArc(h) => write!(f, "arc height must be positive, got {h}"),
            Self::InvalidFlightTime(t) => write!(f, "flight time must be positive, got {t}"),
        }
    }
}

impl std::error::Error for TrajectoryError {}
