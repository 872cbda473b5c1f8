//! Aspect-specific prediction models.

mod article;
mod merge;
mod name_order;
mod number;

pub use article::ArticleModel;
pub use merge::MergeModel;
pub use name_order::NameOrderModel;
pub use number::NumberModel;

use crate::aspect::Aspect;
use crate::model::AspectModel;

/// The model for an aspect.
pub fn model_for(aspect: Aspect) -> Box<dyn AspectModel> {
    match aspect {
        Aspect::Merge => Box::new(MergeModel),
        Aspect::NameOrder => Box::new(NameOrderModel),
        Aspect::Number => Box::new(NumberModel),
        Aspect::Article => Box::new(ArticleModel),
    }
}
