pub mod calendar;
pub mod cross_section;
pub mod daily;
pub mod element;
pub mod observation;
pub mod period;
pub mod station;

pub use calendar::{CalendarFields, Dekad, Season};
pub use cross_section::{CrossSection, CrossSectionMeta, CrossSectionRow, PeriodFilter};
pub use daily::{DailyRow, DailyTable};
pub use element::{Aggregation, Element};
pub use observation::{Observation, ObservationTable};
pub use period::{Granularity, PeriodKey, PeriodMeta, PeriodStatistic, PeriodTable, SubPeriod};
pub use station::StationMetadata;
