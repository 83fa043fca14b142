//! Domain models shared between server and clients

mod attendee;
mod coupon;
mod event;
mod reservation;
mod ticket_type;

pub use attendee::{
    AttendeeCreate, AttendeeIdentityUpdate, AttendeeRecord, AttendeeStatus, CAPACITY_HOLDING,
};
pub use coupon::{Coupon, CouponCreate, CouponUpdate};
pub use event::{Event, EventCreate, EventUpdate};
pub use reservation::{Reservation, ReservationCreate};
pub use ticket_type::{TicketType, TicketTypeCreate, TicketTypeUpdate};
