mod data_type;
mod ident;
mod literal;
mod object;

pub use self::{data_type::*, ident::*, literal::*, object::*};
