//! Macros for declaring state identifiers.

/// Generate a state identifier enum and its `StateId` implementation.
///
/// The three mandatory sentinels are appended after the declared states,
/// in this order: `IgnoringEvent`, `CannotHappen`, `MaxStates`.
///
/// # Example
///
/// ```
/// use statechart_engine::core::StateId;
/// use statechart_engine::state_enum;
///
/// state_enum! {
///     pub enum MotorState {
///         Idle,
///         Stopping,
///         Starting,
///         Spinning,
///     }
/// }
///
/// assert_eq!(MotorState::Spinning.index(), 3);
/// assert_eq!(MotorState::MAX_STATES.index(), 6);
/// assert_eq!(MotorState::Starting.name(), "Starting");
/// ```
#[macro_export]
macro_rules! state_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            Debug,
            $crate::serde::Serialize,
            $crate::serde::Deserialize,
        )]
        #[serde(crate = "statechart_engine::serde")]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant,
            )*
            IgnoringEvent,
            CannotHappen,
            MaxStates,
        }

        impl $name {
            const STATE_IDS: &'static [$name] = &[
                $($name::$variant,)*
                $name::IgnoringEvent,
                $name::CannotHappen,
                $name::MaxStates,
            ];
        }

        impl $crate::core::StateId for $name {
            const IGNORING_EVENT: Self = Self::IgnoringEvent;
            const CANNOT_HAPPEN: Self = Self::CannotHappen;
            const MAX_STATES: Self = Self::MaxStates;

            fn index(self) -> usize {
                self as usize
            }

            fn from_index(index: usize) -> Option<Self> {
                Self::STATE_IDS.get(index).copied()
            }

            fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant),)*
                    Self::IgnoringEvent => "IGNORING_EVENT",
                    Self::CannotHappen => "CANNOT_HAPPEN",
                    Self::MaxStates => "MAX_STATES",
                }
            }
        }
    };
}
