mod browse;
mod detail;
mod episode;
mod season;

pub use browse::BrowseView;
pub use detail::DetailView;
pub use episode::EpisodeView;
pub use season::SeasonView;
