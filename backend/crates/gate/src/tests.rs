//! Gate tests: guard properties over the async mount, and the portal
//! scenarios driven through the router

#[cfg(test)]
mod guard_property_tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::sync::Notify;

    use crate::application::mount::{MountedGuard, mount};
    use crate::domain::entity::guard_state::{DenyReason, GuardState};
    use crate::domain::entity::role_record::RoleRecord;
    use crate::domain::entity::session::{SessionEvent, SessionPublisher};
    use crate::domain::repository::RoleDirectory;
    use crate::domain::value_object::{portal_id::PortalId, role_tag::RoleTag, uid::Uid};
    use crate::error::GateResult;
    use crate::infra::memory::InMemoryRoleDirectory;

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn uid(s: &str) -> Uid {
        Uid::new(s).unwrap()
    }

    /// Lookups for gated uids block until released
    #[derive(Default)]
    struct GatedDirectory {
        records: HashMap<Uid, RoleRecord>,
        gates: HashMap<Uid, Arc<Notify>>,
    }

    impl GatedDirectory {
        fn with(mut self, name: &str, role: RoleTag) -> Self {
            self.records.insert(uid(name), RoleRecord::with_role(role));
            self
        }

        fn gated(mut self, name: &str) -> Self {
            self.gates.insert(uid(name), Arc::new(Notify::new()));
            self
        }

        fn release(&self, name: &str) {
            self.gates[&uid(name)].notify_one();
        }
    }

    impl RoleDirectory for GatedDirectory {
        async fn lookup(&self, uid: &Uid) -> GateResult<Option<RoleRecord>> {
            if let Some(gate) = self.gates.get(uid) {
                gate.notified().await;
            }
            Ok(self.records.get(uid).cloned())
        }
    }

    async fn wait_for_state(mounted: &mut MountedGuard, expected: GuardState) {
        if mounted.state() == expected {
            return;
        }
        while let Some(state) = mounted.changed().await {
            if state == expected {
                return;
            }
        }
        panic!("guard stopped before reaching {expected:?}");
    }

    #[tokio::test]
    async fn test_missing_record_denies_every_portal() {
        let directory = Arc::new(InMemoryRoleDirectory::new());
        let session = SessionPublisher::new(SessionEvent::SignedIn(uid("new")));

        for portal in PortalId::ALL {
            let mut mounted = mount(portal, session.subscribe(), directory.clone(), TIMEOUT);
            assert_eq!(
                mounted.settled().await,
                Some(GuardState::Denied {
                    uid: uid("new"),
                    reason: DenyReason::MissingRoleRecord
                }),
                "{portal}"
            );
        }
    }

    #[tokio::test]
    async fn test_record_without_role_denies_every_portal() {
        let directory = Arc::new(InMemoryRoleDirectory::new());
        directory.insert(uid("blank"), RoleRecord::without_role());
        let session = SessionPublisher::new(SessionEvent::SignedIn(uid("blank")));

        for portal in PortalId::ALL {
            let mut mounted = mount(portal, session.subscribe(), directory.clone(), TIMEOUT);
            assert!(
                matches!(mounted.settled().await, Some(GuardState::Denied { .. })),
                "{portal}"
            );
        }
    }

    #[tokio::test]
    async fn test_lookup_failure_denies() {
        let directory = Arc::new(InMemoryRoleDirectory::new());
        directory.insert(uid("a"), RoleRecord::with_role(RoleTag::Admin));
        directory.fail_for(&uid("a"));
        let session = SessionPublisher::new(SessionEvent::SignedIn(uid("a")));

        let mut mounted = mount(PortalId::Admin, session.subscribe(), directory, TIMEOUT);
        assert_eq!(
            mounted.settled().await,
            Some(GuardState::Denied {
                uid: uid("a"),
                reason: DenyReason::LookupFailed
            })
        );
    }

    #[tokio::test]
    async fn test_signed_out_beats_in_flight_lookup() {
        let directory = Arc::new(
            GatedDirectory::default()
                .with("a", RoleTag::EstherLeader)
                .gated("a"),
        );
        let session = SessionPublisher::new(SessionEvent::SignedIn(uid("a")));
        let mut mounted = mount(PortalId::Esther, session.subscribe(), directory.clone(), TIMEOUT);

        wait_for_state(&mut mounted, GuardState::CheckingRole { uid: uid("a") }).await;
        session.publish(SessionEvent::SignedOut);
        assert_eq!(mounted.settled().await, Some(GuardState::SignedOut));

        directory.release("a");
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(mounted.state(), GuardState::SignedOut);
    }

    #[tokio::test]
    async fn test_stale_lookup_never_overwrites_newer_user() {
        let directory = Arc::new(
            GatedDirectory::default()
                .with("a", RoleTag::EstherLeader)
                .with("b", RoleTag::UsherMember)
                .gated("a"),
        );
        let session = SessionPublisher::new(SessionEvent::SignedIn(uid("a")));
        let mut mounted = mount(PortalId::Esther, session.subscribe(), directory.clone(), TIMEOUT);

        wait_for_state(&mut mounted, GuardState::CheckingRole { uid: uid("a") }).await;
        session.publish(SessionEvent::SignedIn(uid("b")));

        let expected = GuardState::Denied {
            uid: uid("b"),
            reason: DenyReason::RoleNotAllowed(RoleTag::UsherMember),
        };
        assert_eq!(mounted.settled().await, Some(expected.clone()));

        // A's lookup finishing late must not authorize B
        directory.release("a");
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(mounted.state(), expected);
    }

    #[tokio::test]
    async fn test_remount_reaches_same_state() {
        let directory = Arc::new(InMemoryRoleDirectory::new());
        directory.insert(uid("m"), RoleRecord::with_role(RoleTag::MediaMember));
        let session = SessionPublisher::new(SessionEvent::SignedIn(uid("m")));

        let mut first = mount(PortalId::Media, session.subscribe(), directory.clone(), TIMEOUT);
        let first_state = first.settled().await;
        drop(first);

        let mut second = mount(PortalId::Media, session.subscribe(), directory.clone(), TIMEOUT);
        assert_eq!(second.settled().await, first_state);
        assert!(matches!(first_state, Some(GuardState::Authorized { .. })));
    }

    #[tokio::test]
    async fn test_portals_do_not_share_lookups() {
        let directory = Arc::new(InMemoryRoleDirectory::new());
        directory.insert(uid("a"), RoleRecord::with_role(RoleTag::Admin));
        let session = SessionPublisher::new(SessionEvent::SignedIn(uid("a")));

        let mut youth = mount(PortalId::Youth, session.subscribe(), directory.clone(), TIMEOUT);
        let mut store = mount(PortalId::Store, session.subscribe(), directory.clone(), TIMEOUT);
        youth.settled().await;
        store.settled().await;

        assert_eq!(directory.lookup_count(), 2);
    }
}

#[cfg(test)]
mod router_tests {
    use std::sync::{Arc, OnceLock};
    use std::time::Duration;

    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, Response, StatusCode, header};
    use platform::password::{ClearTextPassword, HashedPassword};
    use serde::de::DeserializeOwned;
    use tower::ServiceExt;

    use crate::application::config::GateConfig;
    use crate::domain::entity::role_record::RoleRecord;
    use crate::domain::value_object::{portal_id::PortalId, role_tag::RoleTag, uid::Uid};
    use crate::infra::memory::{InMemoryIdentityProvider, InMemoryRoleDirectory};
    use crate::presentation::dto::{HomeView, LoginPage, PageView};
    use crate::presentation::{GateAppState, PortalRegistry, gate_router};

    const PASSWORD: &str = "correct horse battery";

    /// One Argon2 hash shared by every test account
    fn hashed() -> HashedPassword {
        static HASH: OnceLock<HashedPassword> = OnceLock::new();
        HASH.get_or_init(|| {
            ClearTextPassword::new(PASSWORD.to_string())
                .unwrap()
                .hash(None)
                .unwrap()
        })
        .clone()
    }

    struct TestGate {
        router: Router,
        directory: Arc<InMemoryRoleDirectory>,
    }

    fn gate_with(accounts: &[(&str, Option<RoleRecord>)], config: GateConfig) -> TestGate {
        let provider = InMemoryIdentityProvider::new(None);
        let directory = InMemoryRoleDirectory::new();

        for (name, record) in accounts {
            let uid = Uid::new(*name).unwrap();
            provider.add_hashed_account(&format!("{name}@church.org"), hashed(), uid.clone());
            if let Some(record) = record {
                directory.insert(uid, record.clone());
            }
        }

        let state = GateAppState::new(provider, directory, config, PortalRegistry::new().unwrap());
        TestGate {
            directory: state.directory.inner().clone(),
            router: gate_router(state),
        }
    }

    fn gate(accounts: &[(&str, RoleTag)]) -> TestGate {
        let accounts: Vec<(&str, Option<RoleRecord>)> = accounts
            .iter()
            .map(|(name, role)| (*name, Some(RoleRecord::with_role(*role))))
            .collect();
        gate_with(&accounts, GateConfig::development())
    }

    async fn send(router: &Router, req: Request<Body>) -> Response<Body> {
        router.clone().oneshot(req).await.unwrap()
    }

    async fn get(router: &Router, path: &str, cookie: Option<&str>) -> Response<Body> {
        let mut req = Request::get(path);
        if let Some(cookie) = cookie {
            req = req.header(header::COOKIE, cookie);
        }
        send(router, req.body(Body::empty()).unwrap()).await
    }

    fn login_request(portal: &str, name: &str, password: &str, cookie: Option<&str>) -> Request<Body> {
        let mut req = Request::post(format!("/{portal}/login"))
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            req = req.header(header::COOKIE, cookie);
        }
        let password = password.replace(' ', "+");
        req.body(Body::from(format!("email={name}%40church.org&password={password}")))
            .unwrap()
    }

    /// Sign in through a portal's login form; returns the `name=value` cookie pair
    async fn login(router: &Router, portal: &str, name: &str) -> String {
        let res = send(router, login_request(portal, name, PASSWORD, None)).await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&res), format!("/{portal}/dashboard"));

        let set_cookie = res.headers()[header::SET_COOKIE].to_str().unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }

    fn location(res: &Response<Body>) -> &str {
        res.headers()[header::LOCATION].to_str().unwrap()
    }

    async fn json<T: DeserializeOwned>(res: Response<Body>) -> T {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn assert_redirect(res: &Response<Body>, target: &str) {
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(res), target);
    }

    #[tokio::test]
    async fn test_esther_member_reaches_dashboard() {
        let gate = gate(&[("ruth", RoleTag::EstherMember)]);
        let cookie = login(&gate.router, "esther", "ruth").await;

        let res = get(&gate.router, "/esther/dashboard", Some(&cookie)).await;
        assert_eq!(res.status(), StatusCode::OK);

        let view: PageView = json(res).await;
        assert_eq!(view.portal, PortalId::Esther);
        assert_eq!(view.page, "dashboard");
        assert_eq!(view.role, RoleTag::EstherMember);
        assert_eq!(view.uid, "ruth");
        assert_eq!(view.logout_action, "/esther/logout");
    }

    #[tokio::test]
    async fn test_signed_out_goes_to_portal_login() {
        let gate = gate(&[]);

        let res = get(&gate.router, "/esther/dashboard", None).await;
        assert_redirect(&res, "/esther/login");

        let res = get(&gate.router, "/esther/login", None).await;
        assert_eq!(res.status(), StatusCode::OK);
        let page: LoginPage = json(res).await;
        assert_eq!(page.action, "/esther/login");
        assert!(page.error.is_none());
    }

    #[tokio::test]
    async fn test_forged_cookie_is_signed_out() {
        let gate = gate(&[]);
        let res = get(&gate.router, "/usher/dashboard", Some("portal_session=forged")).await;
        assert_redirect(&res, "/usher/login");
    }

    #[tokio::test]
    async fn test_wrong_role_goes_home_not_login() {
        let gate = gate(&[("sam", RoleTag::UsherMember)]);
        let cookie = login(&gate.router, "esther", "sam").await;

        let res = get(&gate.router, "/esther/dashboard", Some(&cookie)).await;
        assert_redirect(&res, "/");

        let res = get(&gate.router, "/usher/dashboard", Some(&cookie)).await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_record_without_role_denied_everywhere() {
        let gate = gate_with(
            &[("blank", Some(RoleRecord::without_role()))],
            GateConfig::development(),
        );
        let cookie = login(&gate.router, "members", "blank").await;

        for portal in PortalId::ALL {
            let res = get(&gate.router, &format!("/{}/dashboard", portal.slug()), Some(&cookie)).await;
            assert_redirect(&res, "/");
        }
    }

    #[tokio::test]
    async fn test_missing_record_denied() {
        let gate = gate_with(&[("new", None)], GateConfig::development());
        let cookie = login(&gate.router, "members", "new").await;

        let res = get(&gate.router, "/members/dashboard", Some(&cookie)).await;
        assert_redirect(&res, "/");
    }

    #[tokio::test]
    async fn test_volunteer_portal_override_policy() {
        let gate = gate(&[
            ("vera", RoleTag::Volunteer),
            ("ada", RoleTag::Admin),
            ("sue", RoleTag::SuperAdmin),
        ]);

        let cookie = login(&gate.router, "volunteer", "vera").await;
        let res = get(&gate.router, "/volunteer/dashboard", Some(&cookie)).await;
        assert_eq!(res.status(), StatusCode::OK);

        let cookie = login(&gate.router, "volunteer", "ada").await;
        let res = get(&gate.router, "/volunteer/dashboard", Some(&cookie)).await;
        assert_eq!(res.status(), StatusCode::OK);

        // Admin-only override: super_admin is not admitted here
        let cookie = login(&gate.router, "volunteer", "sue").await;
        let res = get(&gate.router, "/volunteer/dashboard", Some(&cookie)).await;
        assert_redirect(&res, "/");
    }

    #[tokio::test]
    async fn test_super_admin_portal_sends_admin_to_own_landing() {
        let gate = gate(&[("ada", RoleTag::Admin), ("sue", RoleTag::SuperAdmin)]);

        let cookie = login(&gate.router, "super-admin", "ada").await;
        let res = get(&gate.router, "/super-admin/dashboard", Some(&cookie)).await;
        assert_redirect(&res, "/admin/dashboard");

        let cookie = login(&gate.router, "super-admin", "sue").await;
        let res = get(&gate.router, "/super-admin/dashboard", Some(&cookie)).await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_bad_credentials_stay_on_login() {
        let gate = gate(&[("ruth", RoleTag::EstherMember)]);

        let res = send(
            &gate.router,
            login_request("esther", "ruth", "wrong horse battery", None),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert!(res.headers().get(header::SET_COOKIE).is_none());

        let page: LoginPage = json(res).await;
        assert_eq!(page.error.as_deref(), Some("Invalid email or password"));
    }

    #[tokio::test]
    async fn test_logout_signs_session_out() {
        let gate = gate(&[("ruth", RoleTag::EstherMember)]);
        let cookie = login(&gate.router, "esther", "ruth").await;

        let req = Request::post("/esther/logout")
            .header(header::COOKIE, &cookie)
            .body(Body::empty())
            .unwrap();
        let res = send(&gate.router, req).await;
        assert_redirect(&res, "/esther/login");
        assert!(
            res.headers()[header::SET_COOKIE]
                .to_str()
                .unwrap()
                .contains("Max-Age=0")
        );

        // The old cookie now names a signed-out session
        let res = get(&gate.router, "/esther/dashboard", Some(&cookie)).await;
        assert_redirect(&res, "/esther/login");
    }

    #[tokio::test]
    async fn test_logout_with_forged_cookie_still_clears_it() {
        let gate = gate(&[]);
        let req = Request::post("/esther/logout")
            .header(header::COOKIE, "portal_session=forged")
            .body(Body::empty())
            .unwrap();
        let res = send(&gate.router, req).await;
        assert_redirect(&res, "/esther/login");
        assert!(
            res.headers()[header::SET_COOKIE]
                .to_str()
                .unwrap()
                .contains("Max-Age=0")
        );
    }

    #[tokio::test]
    async fn test_login_never_adopts_carried_cookie() {
        let gate = gate(&[("mallory", RoleTag::Member), ("ruth", RoleTag::Treasurer)]);

        // A cookie from another account, planted in the browser before sign-in
        let planted = login(&gate.router, "members", "mallory").await;

        let res = send(&gate.router, login_request("finance", "ruth", PASSWORD, Some(&planted))).await;
        assert_redirect(&res, "/finance/dashboard");
        let set_cookie = res.headers()[header::SET_COOKIE].to_str().unwrap();
        let issued = set_cookie.split(';').next().unwrap().to_string();
        assert_ne!(issued, planted);

        // The planted cookie is signed out and never becomes ruth
        let res = get(&gate.router, "/finance/dashboard", Some(&planted)).await;
        assert_redirect(&res, "/finance/login");
        let res = get(&gate.router, "/members/dashboard", Some(&planted)).await;
        assert_redirect(&res, "/members/login");

        let res = get(&gate.router, "/finance/dashboard", Some(&issued)).await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_expired_session_goes_to_login() {
        let config = GateConfig {
            session_ttl: Duration::from_millis(50),
            ..GateConfig::development()
        };
        let gate = gate_with(&[("ruth", Some(RoleRecord::with_role(RoleTag::EstherMember)))], config);
        let cookie = login(&gate.router, "esther", "ruth").await;

        let res = get(&gate.router, "/esther/dashboard", Some(&cookie)).await;
        assert_eq!(res.status(), StatusCode::OK);

        tokio::time::sleep(Duration::from_millis(100)).await;

        // Still correctly signed, but the session behind it has expired
        let res = get(&gate.router, "/esther/dashboard", Some(&cookie)).await;
        assert_redirect(&res, "/esther/login");
    }

    #[tokio::test]
    async fn test_index_redirects_to_dashboard() {
        let gate = gate(&[("ruth", RoleTag::EstherMember)]);
        let cookie = login(&gate.router, "esther", "ruth").await;

        let res = get(&gate.router, "/esther", Some(&cookie)).await;
        assert_redirect(&res, "/esther/dashboard");
    }

    #[tokio::test]
    async fn test_unknown_page_not_found() {
        let gate = gate(&[("ruth", RoleTag::EstherMember)]);
        let cookie = login(&gate.router, "esther", "ruth").await;

        let res = get(&gate.router, "/esther/ledger", Some(&cookie)).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_restricted_nav_item() {
        let gate = gate(&[
            ("tess", RoleTag::SundaySchoolTeacher),
            ("sol", RoleTag::SundaySchoolSuperintendent),
        ]);

        let cookie = login(&gate.router, "sunday-school", "tess").await;
        let view: PageView = json(get(&gate.router, "/sunday-school/dashboard", Some(&cookie)).await).await;
        assert!(view.nav.iter().all(|link| link.page != "superintendent"));

        let res = get(&gate.router, "/sunday-school/superintendent", Some(&cookie)).await;
        assert_redirect(&res, "/sunday-school/dashboard");

        let cookie = login(&gate.router, "sunday-school", "sol").await;
        let view: PageView = json(get(&gate.router, "/sunday-school/dashboard", Some(&cookie)).await).await;
        assert!(view.nav.iter().any(|link| link.path == "/sunday-school/superintendent"));

        let res = get(&gate.router, "/sunday-school/superintendent", Some(&cookie)).await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_lookup_timeout_denies() {
        let config = GateConfig {
            role_lookup_timeout: Duration::from_millis(50),
            ..GateConfig::development()
        };
        let gate = gate_with(
            &[("slow", Some(RoleRecord::with_role(RoleTag::Member)))],
            config,
        );
        gate.directory
            .set_delay(&Uid::new("slow").unwrap(), Duration::from_secs(60));

        let cookie = login(&gate.router, "members", "slow").await;
        let res = get(&gate.router, "/members/dashboard", Some(&cookie)).await;
        assert_redirect(&res, "/");
    }

    #[tokio::test]
    async fn test_lookup_failure_denies() {
        let gate = gate(&[("ada", RoleTag::Admin)]);
        gate.directory.fail_for(&Uid::new("ada").unwrap());

        let cookie = login(&gate.router, "admin", "ada").await;
        let res = get(&gate.router, "/admin/dashboard", Some(&cookie)).await;
        assert_redirect(&res, "/");
    }

    #[tokio::test]
    async fn test_fresh_lookup_per_portal_by_default() {
        let gate = gate(&[("ada", RoleTag::Admin)]);
        let cookie = login(&gate.router, "admin", "ada").await;

        get(&gate.router, "/admin/dashboard", Some(&cookie)).await;
        get(&gate.router, "/youth/dashboard", Some(&cookie)).await;
        assert_eq!(gate.directory.lookup_count(), 2);
    }

    #[tokio::test]
    async fn test_role_cache_shared_until_sign_out() {
        let config = GateConfig {
            role_cache_ttl: Some(Duration::from_secs(60)),
            ..GateConfig::development()
        };
        let gate = gate_with(&[("ada", Some(RoleRecord::with_role(RoleTag::Admin)))], config);
        let cookie = login(&gate.router, "admin", "ada").await;

        get(&gate.router, "/admin/dashboard", Some(&cookie)).await;
        get(&gate.router, "/youth/dashboard", Some(&cookie)).await;
        assert_eq!(gate.directory.lookup_count(), 1);

        let req = Request::post("/admin/logout")
            .header(header::COOKIE, &cookie)
            .body(Body::empty())
            .unwrap();
        send(&gate.router, req).await;

        let cookie = login(&gate.router, "admin", "ada").await;
        get(&gate.router, "/admin/dashboard", Some(&cookie)).await;
        assert_eq!(gate.directory.lookup_count(), 2);
    }

    #[tokio::test]
    async fn test_home_lists_portals() {
        let gate = gate(&[]);
        let res = get(&gate.router, "/", None).await;
        assert_eq!(res.status(), StatusCode::OK);

        let home: HomeView = json(res).await;
        assert_eq!(home.portals.len(), PortalId::ALL.len());
        assert!(
            home.portals
                .iter()
                .any(|link| link.login_path == "/sunday-school/login")
        );
    }
}
