pub mod case;
pub mod case_event;
pub mod detainee;
pub mod judge;
pub mod lawyer;
