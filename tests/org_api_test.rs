// ==========================================
// 组织单元 API 集成测试
// ==========================================

mod helpers;
mod test_helpers;

use church_admin::api::{ApiError, OrgUnitPatch};
use church_admin::domain::types::OrgLevel;
use church_admin::query::{ListQuery, SortDirection, SortState};
use church_admin::validation::OrgUnitForm;
use helpers::api_test_helper::{ApiTestEnv, ACTOR};

#[test]
fn test_create_region_requires_state() {
    let env = ApiTestEnv::new().unwrap();

    let err = env
        .org_api
        .create(OrgUnitForm::new(OrgLevel::Region, "Ikeja"), ACTOR)
        .unwrap_err();
    let errors = err.field_errors().expect("应为字段级错误");
    assert!(errors.has_field("state_id"));
}

#[test]
fn test_create_rejects_parent_of_wrong_level() {
    let env = ApiTestEnv::new().unwrap();
    let (_, region, _) = env.create_hierarchy();

    // 把大区 id 当作州 id
    let err = env
        .org_api
        .create(
            OrgUnitForm::new(OrgLevel::Region, "Lekki").with_parent(OrgLevel::State, region.id),
            ACTOR,
        )
        .unwrap_err();
    assert!(matches!(err, ApiError::ValidationFailed { .. }));
}

#[test]
fn test_duplicate_name_rejected_case_insensitive() {
    let env = ApiTestEnv::new().unwrap();
    env.create_state("Lagos");

    let err = env
        .org_api
        .create(OrgUnitForm::new(OrgLevel::State, "LAGOS"), ACTOR)
        .unwrap_err();
    assert!(matches!(err, ApiError::BusinessRuleViolation(_)));
}

#[test]
fn test_children_for_cascading_select() {
    let env = ApiTestEnv::new().unwrap();
    let (state, region, group) = env.create_hierarchy();
    env.create_region(&state, "Lekki");

    let regions = env.org_api.children(OrgLevel::Region, state.id).unwrap();
    assert_eq!(regions.len(), 2);

    let groups = env.org_api.children(OrgLevel::Group, region.id).unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].id, group.id);

    // 州不能挂在组下面
    assert!(env.org_api.children(OrgLevel::State, group.id).is_err());
}

#[test]
fn test_update_keeps_level() {
    let env = ApiTestEnv::new().unwrap();
    let state = env.create_state("Lagos");

    let mut form = OrgUnitForm::from(&state);
    form.leader = Some("Pastor Ade".to_string());
    let updated = env.org_api.update(state.id, form, ACTOR).unwrap();
    assert_eq!(updated.leader.as_deref(), Some("Pastor Ade"));

    let mut form = OrgUnitForm::from(&updated);
    form.level = OrgLevel::Region;
    let err = env.org_api.update(state.id, form, ACTOR).unwrap_err();
    assert!(matches!(err, ApiError::BusinessRuleViolation(_)));
}

#[test]
fn test_delete_with_dependents_rejected() {
    let env = ApiTestEnv::new().unwrap();
    let (state, region, group) = env.create_hierarchy();

    assert!(matches!(
        env.org_api.delete(state.id, ACTOR),
        Err(ApiError::BusinessRuleViolation(_))
    ));

    env.org_api.delete(group.id, ACTOR).unwrap();
    env.org_api.delete(region.id, ACTOR).unwrap();
    env.org_api.delete(state.id, ACTOR).unwrap();
    assert!(matches!(env.org_api.get(state.id), Err(ApiError::NotFound(_))));
}

#[test]
fn test_bulk_delete_reports_failures() {
    let env = ApiTestEnv::new().unwrap();
    let (state, _, _) = env.create_hierarchy();
    let empty = env.create_state("Ogun");

    let outcome = env.org_api.bulk_delete(&[empty.id, state.id, 9999], ACTOR);
    assert_eq!(outcome.succeeded, vec![empty.id]);
    assert_eq!(outcome.failed.len(), 2);
    assert_eq!(outcome.failed[0].0, state.id);
    assert_eq!(outcome.failed[1].0, 9999);
}

#[test]
fn test_bulk_update_reassigns_leader() {
    let env = ApiTestEnv::new().unwrap();
    let state = env.create_state("Lagos");
    let a = env.create_region(&state, "Ikeja");
    let b = env.create_region(&state, "Lekki");

    let patch = OrgUnitPatch {
        leader: Some("Bro. John".to_string()),
        ..Default::default()
    };
    let outcome = env.org_api.bulk_update(&[a.id, b.id], &patch, ACTOR);
    assert!(outcome.all_succeeded());

    for id in [a.id, b.id] {
        let unit = env.org_api.get(id).unwrap();
        assert_eq!(unit.leader.as_deref(), Some("Bro. John"));
        assert_eq!(unit.state_id, Some(state.id));
    }
}

#[test]
fn test_list_search_sort_paginate() {
    let env = ApiTestEnv::new().unwrap();
    for name in ["Oyo", "Abia", "Lagos", "Kano", "Ogun"] {
        env.create_state(name);
    }

    let mut sort = SortState::ascending("name");
    let query = ListQuery::page(1, 2).with_sort(sort.clone());
    let page = env.org_api.list(OrgLevel::State, &query).unwrap();
    assert_eq!(page.total, 5);
    assert_eq!(page.total_pages, 3);
    let names: Vec<_> = page.items.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(names, vec!["Abia", "Kano"]);

    // 同一字段再点一次 → 倒序
    sort.toggle("name");
    assert_eq!(sort.direction, SortDirection::Desc);
    let page = env
        .org_api
        .list(OrgLevel::State, &ListQuery::page(1, 2).with_sort(sort))
        .unwrap();
    let names: Vec<_> = page.items.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(names, vec!["Oyo", "Ogun"]);

    // 搜索 + 越界页
    let page = env
        .org_api
        .list(OrgLevel::State, &ListQuery::page(1, 10).with_search("O"))
        .unwrap();
    // Oyo / Lagos / Kano / Ogun
    assert_eq!(page.total, 4);
    let page = env
        .org_api
        .list(OrgLevel::State, &ListQuery::page(9, 10))
        .unwrap();
    assert!(page.items.is_empty());
}

#[test]
fn test_writes_are_logged() {
    let env = ApiTestEnv::new().unwrap();
    let state = env.create_state("Lagos");
    env.org_api.delete(state.id, ACTOR).unwrap();

    let actions = env.dashboard_api.recent_actions(10).unwrap();
    assert_eq!(actions.len(), 2);
    assert!(actions.iter().all(|a| a.actor == ACTOR));
}
