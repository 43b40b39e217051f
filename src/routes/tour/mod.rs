mod handler;
mod model;

pub use handler::{
    close_tour, create_review, create_tour, get_tour_detail, join_tour, leave_tour, list_tours,
    my_tours,
};
pub use model::Tour;
