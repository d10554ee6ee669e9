//! One-shot endpoint accessors
//!
//! Each accessor builds an endpoint's parameter set, signs it when that
//! endpoint demands it, and returns the unwrapped `data` payload. Search,
//! detail, and play-url payloads vary too much to type, so they come back
//! as raw JSON; the two reply endpoints return the typed page shapes the
//! comment crawler loops over.

use serde_json::Value;

use crate::models::{CommentOrder, CommentPage, ReplyPage, SearchOrder};
use crate::sign::ParamMap;
use crate::{BiliError, Result};

use super::BiliClient;

const SEARCH_PATH: &str = "/x/web-interface/wbi/search/type";
const VIDEO_DETAIL_PATH: &str = "/x/web-interface/view/detail";
const PLAY_URL_PATH: &str = "/x/player/wbi/playurl";
const CREATOR_VIDEOS_PATH: &str = "/x/space/wbi/arc/search";
const COMMENT_PATH: &str = "/x/v2/reply/wbi/main";
const REPLY_PATH: &str = "/x/v2/reply/reply";

/// Page size the platform serves for top-level comment pages
const COMMENT_PAGE_SIZE: i64 = 20;

impl BiliClient {
    /// Searches videos by keyword
    ///
    /// # Arguments
    ///
    /// * `keyword` - search text
    /// * `page` / `page_size` - pagination, 1-based
    /// * `order` - result ranking
    /// * `pubtime_begin_s` / `pubtime_end_s` - unix-seconds publish-time
    ///   window; zero leaves the bound open
    pub async fn search_videos(
        &self,
        keyword: &str,
        page: i64,
        page_size: i64,
        order: SearchOrder,
        pubtime_begin_s: i64,
        pubtime_end_s: i64,
    ) -> Result<Value> {
        let params = ParamMap::from([
            ("search_type".to_string(), "video".to_string()),
            ("keyword".to_string(), keyword.to_string()),
            ("page".to_string(), page.to_string()),
            ("page_size".to_string(), page_size.to_string()),
            ("order".to_string(), order.as_param().to_string()),
            ("pubtime_begin_s".to_string(), pubtime_begin_s.to_string()),
            ("pubtime_end_s".to_string(), pubtime_end_s.to_string()),
        ]);

        self.get(SEARCH_PATH, &params, true).await
    }

    /// Searches creator accounts by keyword, ranked by fan count
    pub async fn search_creators(
        &self,
        keyword: &str,
        page: i64,
        page_size: i64,
    ) -> Result<Value> {
        let params = ParamMap::from([
            ("search_type".to_string(), "bili_user".to_string()),
            ("keyword".to_string(), keyword.to_string()),
            ("page".to_string(), page.to_string()),
            ("page_size".to_string(), page_size.to_string()),
            ("order".to_string(), "fans".to_string()),
            ("pubtime_begin_s".to_string(), "0".to_string()),
            ("pubtime_end_s".to_string(), "0".to_string()),
        ]);

        self.get(SEARCH_PATH, &params, true).await
    }

    /// Fetches video detail by numeric `aid` or string `bvid`
    ///
    /// `aid` wins when both are given; a non-positive `aid` counts as
    /// absent. Fails before any network traffic when neither identifier is
    /// usable. This endpoint is served unsigned.
    pub async fn video_detail(&self, aid: Option<i64>, bvid: Option<&str>) -> Result<Value> {
        let aid = aid.filter(|id| *id > 0);
        let bvid = bvid.filter(|id| !id.is_empty());

        let params = match (aid, bvid) {
            (Some(aid), _) => ParamMap::from([("aid".to_string(), aid.to_string())]),
            (None, Some(bvid)) => ParamMap::from([("bvid".to_string(), bvid.to_string())]),
            (None, None) => {
                return Err(BiliError::InvalidArgument(
                    "video detail needs an aid or a bvid".to_string(),
                ));
            }
        };

        self.get(VIDEO_DETAIL_PATH, &params, false).await
    }

    /// Fetches stream information for one video page
    ///
    /// Both identifiers must be strictly positive; the guard runs before
    /// any network traffic.
    pub async fn play_url(&self, aid: i64, cid: i64) -> Result<Value> {
        if aid <= 0 || cid <= 0 {
            return Err(BiliError::InvalidArgument(
                "play url needs positive aid and cid".to_string(),
            ));
        }

        let params = ParamMap::from([
            ("avid".to_string(), aid.to_string()),
            ("cid".to_string(), cid.to_string()),
            ("qn".to_string(), "80".to_string()),
            ("fourk".to_string(), "1".to_string()),
            ("fnval".to_string(), "1".to_string()),
            ("platform".to_string(), "pc".to_string()),
        ]);

        self.get(PLAY_URL_PATH, &params, true).await
    }

    /// Fetches one page of a creator's published videos
    pub async fn creator_videos(
        &self,
        creator_id: &str,
        pn: i64,
        ps: i64,
        order: SearchOrder,
    ) -> Result<Value> {
        let params = ParamMap::from([
            ("mid".to_string(), creator_id.to_string()),
            ("pn".to_string(), pn.to_string()),
            ("ps".to_string(), ps.to_string()),
            ("order".to_string(), order.as_param().to_string()),
        ]);

        self.get(CREATOR_VIDEOS_PATH, &params, true).await
    }

    /// Fetches one page of top-level comments for a video
    ///
    /// # Arguments
    ///
    /// * `video_id` - the video's numeric id (`oid` on the wire)
    /// * `order` - thread ordering
    /// * `next` - cursor offset from the previous page; zero for the first
    pub async fn comment_page(
        &self,
        video_id: &str,
        order: CommentOrder,
        next: i64,
    ) -> Result<CommentPage> {
        let params = ParamMap::from([
            ("oid".to_string(), video_id.to_string()),
            ("mode".to_string(), order.as_mode().to_string()),
            ("type".to_string(), "1".to_string()),
            ("ps".to_string(), COMMENT_PAGE_SIZE.to_string()),
            ("next".to_string(), next.to_string()),
        ]);

        let data = self.get(COMMENT_PATH, &params, true).await?;
        CommentPage::from_data(data)
    }

    /// Fetches one page of nested replies under a root comment
    pub async fn reply_page(
        &self,
        video_id: &str,
        root_id: i64,
        pn: i64,
        ps: i64,
        order: CommentOrder,
    ) -> Result<ReplyPage> {
        let params = ParamMap::from([
            ("oid".to_string(), video_id.to_string()),
            ("mode".to_string(), order.as_mode().to_string()),
            ("type".to_string(), "1".to_string()),
            ("ps".to_string(), ps.to_string()),
            ("pn".to_string(), pn.to_string()),
            ("root".to_string(), root_id.to_string()),
        ]);

        let data = self.get(REPLY_PATH, &params, true).await?;
        ReplyPage::from_data(data)
    }
}
