//! Booking API contract
//!
//! The reservation core only talks to the backend through this trait, so
//! tests can swap in an in-process fake.

use crate::ClientResult;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use shared::{BookingConfirmation, BookingRequest, MenuItem, Room};

#[async_trait]
pub trait BookingApi: Send + Sync {
    /// 获取菜单
    async fn fetch_menu_items(&self) -> ClientResult<Vec<MenuItem>>;

    /// 获取房间列表，服务端按日期/时间计算 `booked_for_date`
    async fn fetch_rooms(
        &self,
        date: Option<NaiveDate>,
        time: Option<NaiveTime>,
    ) -> ClientResult<Vec<Room>>;

    /// 创建预订
    async fn create_booking(&self, request: &BookingRequest) -> ClientResult<BookingConfirmation>;
}
