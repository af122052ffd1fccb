mod flow;
mod id;

pub use self::{
    flow::{Flow, FlowedLink},
    id::DatapathLink,
};
