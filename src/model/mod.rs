pub mod deduction;
pub mod employee;
pub mod payroll;
pub mod timesheet;
