use crate::settings::{Arrangement, LayerSettings};

pub(crate) mod point;
pub(crate) mod polygon;

pub(crate) fn layer(arrangement: Arrangement) -> LayerSettings {
    LayerSettings::new("test", arrangement)
}
