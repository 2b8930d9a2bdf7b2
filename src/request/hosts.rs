//! Recognized API hosts and legacy dispatch tables.

use once_cell::sync::Lazy;
use std::collections::HashSet;

pub const GRAPH: &str = "graph.facebook.com";
pub const GRAPH_BETA: &str = "graph.beta.facebook.com";
pub const GRAPH_VIDEO: &str = "graph-video.facebook.com";
pub const GRAPH_VIDEO_BETA: &str = "graph-video.beta.facebook.com";

pub const REST: &str = "api.facebook.com";
pub const REST_BETA: &str = "api.beta.facebook.com";
pub const REST_READ_ONLY: &str = "api-read.facebook.com";
pub const REST_READ_ONLY_BETA: &str = "api-read.beta.facebook.com";
pub const REST_VIDEO: &str = "api-video.facebook.com";
pub const REST_VIDEO_BETA: &str = "api-video.beta.facebook.com";

pub const WWW: &str = "www.facebook.com";
pub const WWW_BETA: &str = "www.beta.facebook.com";
pub const APPS: &str = "apps.facebook.com";
pub const APPS_BETA: &str = "apps.beta.facebook.com";

/// Hosts recognized as the Graph API surface.
static GRAPH_HOSTS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| [GRAPH, GRAPH_BETA, GRAPH_VIDEO, GRAPH_VIDEO_BETA].into());

/// Hosts recognized as the legacy REST surface.
static REST_HOSTS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        REST,
        REST_BETA,
        REST_READ_ONLY,
        REST_READ_ONLY_BETA,
        REST_VIDEO,
        REST_VIDEO_BETA,
    ]
    .into()
});

/// Legacy RPC methods that are safe to route to the read-only host.
static READ_ONLY_CALLS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "admin.getallocation",
        "admin.getappproperties",
        "admin.getbannedusers",
        "admin.getlivestreamvialink",
        "admin.getmetrics",
        "admin.getrestrictioninfo",
        "application.getpublicinfo",
        "auth.getapppublickey",
        "auth.getsession",
        "auth.getsignedpublicsessiondata",
        "comments.get",
        "connect.getunconnectedfriendscount",
        "dashboard.getactivity",
        "dashboard.getcount",
        "dashboard.getglobalnews",
        "dashboard.getnews",
        "dashboard.multigetcount",
        "dashboard.multigetnews",
        "data.getcookies",
        "events.get",
        "events.getmembers",
        "fbml.getcustomtags",
        "feed.getappfriendstories",
        "feed.getregisteredtemplatebundlebyid",
        "feed.getregisteredtemplatebundles",
        "fql.multiquery",
        "fql.query",
        "friends.arefriends",
        "friends.get",
        "friends.getappusers",
        "friends.getlists",
        "friends.getmutualfriends",
        "gifts.get",
        "groups.get",
        "groups.getmembers",
        "intl.gettranslations",
        "links.get",
        "notes.get",
        "notifications.get",
        "pages.getinfo",
        "pages.isadmin",
        "pages.isappadded",
        "pages.isfan",
        "permissions.checkavailableapiaccess",
        "permissions.checkgrantedapiaccess",
        "photos.get",
        "photos.getalbums",
        "photos.gettags",
        "profile.getinfo",
        "profile.getinfooptions",
        "stream.get",
        "stream.getcomments",
        "stream.getfilters",
        "users.getinfo",
        "users.getloggedinuser",
        "users.getstandardinfo",
        "users.hasapppermission",
        "users.isappuser",
        "users.isverified",
        "video.getuploadlimits",
    ]
    .into()
});

/// Site hosts (`www`/`apps`). Recognized when classifying a caller-supplied
/// URL, never selected as a request target.
static SITE_HOSTS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| [WWW, WWW_BETA, APPS, APPS_BETA].into());

pub fn is_graph_host(host: &str) -> bool {
    GRAPH_HOSTS.contains(host)
}

pub fn is_site_host(host: &str) -> bool {
    SITE_HOSTS.contains(host)
}

pub fn is_rest_host(host: &str) -> bool {
    REST_HOSTS.contains(host)
}

/// Pick the legacy REST host for an RPC method name.
///
/// `video.upload` goes to the dedicated video host, known read-only calls go
/// to the read-only host, everything else to the generic RPC host.
pub fn rest_host_for(method: &str, beta: bool) -> &'static str {
    let method = method.to_ascii_lowercase();
    if method == "video.upload" {
        if beta { REST_VIDEO_BETA } else { REST_VIDEO }
    } else if READ_ONLY_CALLS.contains(method.as_str()) {
        if beta {
            REST_READ_ONLY_BETA
        } else {
            REST_READ_ONLY
        }
    } else if beta {
        REST_BETA
    } else {
        REST
    }
}

/// Pick the Graph API host.
///
/// Video uploads (POST to a `/videos` edge) go to the dedicated video host.
pub fn graph_host_for(is_post: bool, path: &str, beta: bool) -> &'static str {
    let path = path.trim_end_matches('/');
    let video_upload = is_post && (path == "videos" || path.ends_with("/videos"));
    match (video_upload, beta) {
        (true, true) => GRAPH_VIDEO_BETA,
        (true, false) => GRAPH_VIDEO,
        (false, true) => GRAPH_BETA,
        (false, false) => GRAPH,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rest_host_dispatch() {
        assert_eq!(rest_host_for("video.upload", false), REST_VIDEO);
        assert_eq!(rest_host_for("video.upload", true), REST_VIDEO_BETA);
        assert_eq!(rest_host_for("fql.query", false), REST_READ_ONLY);
        assert_eq!(rest_host_for("FQL.Query", false), REST_READ_ONLY);
        assert_eq!(rest_host_for("stream.publish", false), REST);
        assert_eq!(rest_host_for("stream.publish", true), REST_BETA);
    }

    #[test]
    fn graph_host_dispatch() {
        assert_eq!(graph_host_for(true, "me/videos", false), GRAPH_VIDEO);
        assert_eq!(graph_host_for(false, "me/videos", false), GRAPH);
        assert_eq!(graph_host_for(true, "me/feed", false), GRAPH);
        assert_eq!(graph_host_for(true, "me/videos", true), GRAPH_VIDEO_BETA);
    }

    #[test]
    fn host_recognition() {
        assert!(is_graph_host("graph.facebook.com"));
        assert!(is_graph_host("graph-video.beta.facebook.com"));
        assert!(is_rest_host("api-read.facebook.com"));
        assert!(!is_graph_host("example.com"));
        assert!(!is_rest_host("graph.facebook.com"));
    }

    #[test]
    fn site_hosts_classify_without_being_api_surfaces() {
        assert!(is_site_host("www.facebook.com"));
        assert!(is_site_host("apps.beta.facebook.com"));
        assert!(!is_graph_host("www.facebook.com"));
        assert!(!is_rest_host("apps.facebook.com"));
        assert!(!is_site_host("graph.facebook.com"));
    }
}
