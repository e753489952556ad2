#[cfg(feature = "arrow")]
pub mod arrow;
pub mod dataframe;
pub mod groupby;
pub mod io;
pub mod sample;
pub mod series;
pub mod value;

pub use dataframe::{DataFrame, Keep};
pub use groupby::{Dataset, GroupedDataFrame, Partition};
pub use sample::{SampleSize, SampleSpec, Weights};
pub use series::{Series, SeriesType};
pub use value::Value;
