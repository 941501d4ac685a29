//! Pure payroll arithmetic: shift splitting, pay derivation and the merge of a
//! recomputed entry into the stored one. Nothing here touches the database.

pub mod policy;
pub mod recalculate;
pub mod shift_hours;

pub use policy::PayPolicy;
pub use recalculate::{PayrollDerived, compute_derived, merge, recalculate_payroll};
pub use shift_hours::{NightStatus, ShiftHours, compute_rostered_shift_hours, compute_shift_hours};
