pub mod answer;
pub mod item;
pub mod presentation;
pub mod report;
