//! Error kinds and their recovery strategies

/// Button error auto-recovery delay
pub const BUTTON_RECOVERY_MS: u32 = 5000;

/// Types of errors the monitor can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorKind {
    /// No error active
    #[default]
    NoError,
    /// Sensor stuck or reading outside its physical range
    SensorError,
    /// Calibration data invalid or missing
    CalibrationError,
    /// Button held down far longer than any real press
    ButtonError,
    /// Host link silent past its timeout
    CommunicationError,
    /// Memory fault (raised outside the monitor)
    MemoryError,
    /// General system fault (raised outside the monitor)
    SystemError,
}

/// How an error kind gets out of the error state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RecoveryStrategy {
    /// Considered recovered on the first attempt
    Immediate,
    /// Recovered once strictly more than this many ms have passed since activation
    AfterMs(u32),
    /// Never recovers on its own; needs an external restart
    Never,
}

impl RecoveryStrategy {
    /// Whether recovery is complete `elapsed_ms` after the error became active
    pub const fn is_recovered(&self, elapsed_ms: u32) -> bool {
        match self {
            RecoveryStrategy::Immediate => true,
            RecoveryStrategy::AfterMs(delay) => elapsed_ms > *delay,
            RecoveryStrategy::Never => false,
        }
    }
}

impl ErrorKind {
    /// Number of kinds, including `NoError`
    pub const COUNT: usize = 7;

    /// All kinds in index order
    pub const ALL: [ErrorKind; Self::COUNT] = [
        ErrorKind::NoError,
        ErrorKind::SensorError,
        ErrorKind::CalibrationError,
        ErrorKind::ButtonError,
        ErrorKind::CommunicationError,
        ErrorKind::MemoryError,
        ErrorKind::SystemError,
    ];

    /// Dense index for per-kind tables
    pub const fn index(self) -> usize {
        match self {
            ErrorKind::NoError => 0,
            ErrorKind::SensorError => 1,
            ErrorKind::CalibrationError => 2,
            ErrorKind::ButtonError => 3,
            ErrorKind::CommunicationError => 4,
            ErrorKind::MemoryError => 5,
            ErrorKind::SystemError => 6,
        }
    }

    /// Numeric error code reported to the host
    pub const fn code(self) -> u8 {
        match self {
            ErrorKind::NoError => 0,
            ErrorKind::SensorError => 1,
            ErrorKind::CalibrationError => 2,
            ErrorKind::ButtonError => 3,
            ErrorKind::CommunicationError => 4,
            ErrorKind::MemoryError => 5,
            ErrorKind::SystemError => 99,
        }
    }

    /// Look up a kind by its reported code
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(ErrorKind::NoError),
            1 => Some(ErrorKind::SensorError),
            2 => Some(ErrorKind::CalibrationError),
            3 => Some(ErrorKind::ButtonError),
            4 => Some(ErrorKind::CommunicationError),
            5 => Some(ErrorKind::MemoryError),
            99 => Some(ErrorKind::SystemError),
            _ => None,
        }
    }

    /// Recovery strategy for this kind
    ///
    /// Sensor and communication faults are retried optimistically: the
    /// next tick's detection re-raises them if they persist. Calibration
    /// recovery is carried out by the caller resetting the store.
    pub const fn recovery_strategy(self) -> RecoveryStrategy {
        match self {
            ErrorKind::NoError => RecoveryStrategy::Immediate,
            ErrorKind::SensorError => RecoveryStrategy::Immediate,
            ErrorKind::CalibrationError => RecoveryStrategy::Immediate,
            ErrorKind::ButtonError => RecoveryStrategy::AfterMs(BUTTON_RECOVERY_MS),
            ErrorKind::CommunicationError => RecoveryStrategy::Immediate,
            ErrorKind::MemoryError => RecoveryStrategy::Never,
            ErrorKind::SystemError => RecoveryStrategy::Never,
        }
    }

    /// Whether this kind needs intervention outside the monitor
    pub const fn requires_restart(self) -> bool {
        matches!(self.recovery_strategy(), RecoveryStrategy::Never)
    }
}
