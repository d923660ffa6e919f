pub mod binning;
pub mod chart;
pub mod export;
pub mod reader;
pub mod summary;
pub mod table;

pub use avse_lens_common::{AvseLensError, Result};
pub use binning::{bin_column, bin_column_name, BinSpec};
pub use chart::{avse_plot, avse_plot_sized, render_avse_svg, AvsePlot};
pub use export::{export_csv, export_json, print_summary};
pub use reader::{open_table, ColumnInfo, TableInfo};
pub use summary::{melt, summarize, BinSummary, LongRecord, SERIES_COUNT, SERIES_PRED, SERIES_TARGET};
pub use table::numeric_values;
