//! Route table and path matching
//!
//! A route is either an exact literal path (`/`, `/about`) or a prefix with a
//! single trailing `:id` segment (`/article/:id`). Resolution tries the
//! literal routes first, then the parameterized ones in definition order.

mod table;
mod url;

pub use table::{Params, Route, RouteMatch, RouteName, RouteTable, RouteTableBuilder};
pub use url::{strip_query_and_fragment, url_for};

/// Name of the single parameter a parameterized route captures
pub const ID_PARAM: &str = "id";
