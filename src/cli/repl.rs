//! Interactive portal interpreter. One blocking prompt per command keeps a
//! single operation outstanding at a time, so a submission cannot be doubled
//! while a request is in flight.

use std::io::{self, Write};

use anyhow::Result;
use serde_json::Value;

use crate::api::{ProfessionalKind, ValidationAction};
use crate::cli::flow::{self, AuthStep, Tab};
use crate::cli::outputformatter::{print_list, print_object};
use crate::cli::theme::Theme;
use crate::session::{adapters, Bootstrap, Portal, RegistrationForm, Role, SessionResolver};
use crate::store::{ClientStore, THEME_KEY};

pub fn run(rt: tokio::runtime::Runtime, mut resolver: SessionResolver, store: ClientStore) -> Result<()> {
    println!("TOHPITOH - electronic health record portal");
    let mut theme = Theme::from_wire(store.get(THEME_KEY)?.as_deref().unwrap_or(""));
    println!("theme: {}", theme);

    let mut step = AuthStep::RoleSelection;
    let mut tab: Option<Tab> = None;

    // Recover a session from the persisted token before prompting.
    match rt.block_on(resolver.bootstrap())? {
        Bootstrap::NoSession => println!("choose a portal: patient | doctor | laboratory | admin"),
        Bootstrap::TokenRejected => {
            println!("stored session was rejected, please sign in again");
            println!("choose a portal: patient | doctor | laboratory | admin");
        }
        Bootstrap::Established(role) => {
            tab = flow::initial_tab(role);
            println!("welcome back, {} ({})", resolver.session().profile.display_name(), role);
            if role == Role::Admin {
                let token = resolver.session().token.clone().unwrap_or_default();
                show_admin_stats(&rt, &resolver, &token);
            }
        }
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut input = String::new();
    println!("type 'help' for commands");
    loop {
        print!("{}", prompt_for(&resolver, &step, tab));
        let _ = stdout.flush();
        input.clear();
        if stdin.read_line(&mut input).is_err() {
            break;
        }
        if input.is_empty() {
            break; // EOF
        }
        let line = input.trim();
        if line.is_empty() {
            continue;
        }
        let up = line.to_uppercase();
        if up == "QUIT" || up == "EXIT" {
            break;
        }
        if up == "THEME" {
            theme = theme.cycle();
            store.set(THEME_KEY, theme.as_wire())?;
            println!("theme: {}", theme);
            continue;
        }
        if up == "HELP" {
            print_help(&resolver, &step);
            continue;
        }
        if resolver.session().is_authenticated() {
            handle_authenticated(&rt, &mut resolver, &mut step, &mut tab, line)?;
        } else {
            handle_auth_flow(&rt, &mut resolver, &mut step, &mut tab, line);
        }
    }
    Ok(())
}

fn prompt_for(resolver: &SessionResolver, step: &AuthStep, tab: Option<Tab>) -> String {
    if resolver.session().is_authenticated() {
        let t = tab.map(|t| t.name()).unwrap_or("-");
        return format!("tohpitoh [{}:{}]> ", resolver.session().role, t);
    }
    match step {
        AuthStep::RoleSelection => "tohpitoh> ".to_string(),
        AuthStep::Login(p) => format!("tohpitoh [{} login]> ", p),
        AuthStep::Register(p) => format!("tohpitoh [{} register]> ", p),
    }
}

fn handle_auth_flow(
    rt: &tokio::runtime::Runtime,
    resolver: &mut SessionResolver,
    step: &mut AuthStep,
    tab: &mut Option<Tab>,
    line: &str,
) {
    let up = line.to_uppercase();
    match *step {
        AuthStep::RoleSelection => {
            let portal = match line.to_lowercase().as_str() {
                "patient" => Some(Portal::Patient),
                "doctor" => Some(Portal::Doctor),
                "laboratory" | "lab" => Some(Portal::Laboratory),
                "admin" => Some(Portal::Admin),
                _ => None,
            };
            match portal {
                Some(p) => {
                    *step = step.select_portal(p);
                    if p == Portal::Admin {
                        println!("{} portal: login <email> <password>", p);
                    } else {
                        println!("{} portal: login <email> <password> | register", p);
                    }
                }
                None => println!("choose a portal: patient | doctor | laboratory | admin"),
            }
        }
        AuthStep::Login(portal) => {
            if up == "BACK" {
                *step = step.back();
                return;
            }
            if up == "REGISTER" {
                let next = step.open_register();
                if next == *step {
                    println!("the admin portal has no self-service registration");
                } else {
                    println!("registering a {} account; type 'submit' to fill the form or 'back'", portal);
                }
                *step = next;
                return;
            }
            if up.starts_with("LOGIN ") {
                let parts: Vec<&str> = line.split_whitespace().collect();
                if parts.len() != 3 {
                    println!("usage: login <email> <password>");
                    return;
                }
                match rt.block_on(resolver.login(parts[1], parts[2], portal)) {
                    Ok(session) => {
                        let role = session.role;
                        *tab = flow::initial_tab(role);
                        println!("signed in as {} ({})", session.profile.display_name(), role);
                        if role.is_patient_alias() {
                            println!("medical records on file: {}", resolver.records().len());
                        }
                        if role == Role::Admin {
                            let token = resolver.session().token.clone().unwrap_or_default();
                            show_admin_stats(rt, resolver, &token);
                        }
                    }
                    Err(e) => println!("login failed: {}", e.message()),
                }
                return;
            }
            println!("commands: login <email> <password> | register | back");
        }
        AuthStep::Register(portal) => {
            if up == "BACK" {
                *step = step.back();
                return;
            }
            if up == "SUBMIT" {
                let form = collect_registration(portal);
                match rt.block_on(resolver.register(&form, portal)) {
                    Ok(()) => {
                        println!("account created, you can now sign in");
                        *step = step.registration_done();
                    }
                    Err(e) => println!("registration failed: {}", e.message()),
                }
                return;
            }
            println!("commands: submit | back");
        }
    }
}

fn handle_authenticated(
    rt: &tokio::runtime::Runtime,
    resolver: &mut SessionResolver,
    step: &mut AuthStep,
    tab: &mut Option<Tab>,
    line: &str,
) -> Result<()> {
    let up = line.to_uppercase();
    let role = resolver.session().role;
    let token = resolver.session().token.clone().unwrap_or_default();

    if up == "LOGOUT" {
        resolver.logout()?;
        // navigation state resets with the session
        *step = AuthStep::RoleSelection;
        *tab = None;
        println!("signed out");
        println!("choose a portal: patient | doctor | laboratory | admin");
        return Ok(());
    }
    if up == "STATUS" {
        let s = resolver.session();
        println!(
            "signed in: {} role={} tab={}",
            s.profile.display_name(),
            s.role,
            tab.map(|t| t.name()).unwrap_or("-")
        );
        return Ok(());
    }
    if up == "TABS" {
        let names: Vec<&str> = flow::tabs_for(role).iter().map(|t| t.name()).collect();
        if names.is_empty() {
            println!("no tabs for an unresolved role; logout and sign in again");
        } else {
            println!("tabs: {}", names.join(" | "));
        }
        return Ok(());
    }
    if let Some(name) = strip_prefix_ci(line, "OPEN ") {
        match flow::tab_for_role(role, &name.to_lowercase()) {
            Some(t) => {
                *tab = Some(t);
                render_tab(rt, resolver, t, &token);
            }
            None => println!("no tab '{}' for the {} role", name, role),
        }
        return Ok(());
    }
    if up == "RECORDS" {
        show_rows(resolver.records());
        return Ok(());
    }
    if let Some(rest) = strip_prefix_ci(line, "UPDATE-PROFILE ") {
        match json_arg(rest) {
            Some(fields) => show_result(rt.block_on(resolver.api().update_profile(&token, &fields))),
            None => println!("usage: update-profile <json>"),
        }
        return Ok(());
    }

    if role.is_patient_alias() && handle_patient(rt, resolver, &token, line) {
        return Ok(());
    }
    if role == Role::Doctor && handle_doctor(rt, resolver, &token, line) {
        return Ok(());
    }
    if role == Role::Laboratory && handle_laboratory(rt, resolver, &token, line) {
        return Ok(());
    }
    if role == Role::Admin && handle_admin(rt, resolver, &token, line) {
        return Ok(());
    }
    println!("unknown command; type 'help'");
    Ok(())
}

fn handle_patient(rt: &tokio::runtime::Runtime, resolver: &SessionResolver, token: &str, line: &str) -> bool {
    let up = line.to_uppercase();
    if up == "DOCTORS" {
        show_rows(&rt.block_on(resolver.api().doctor_directory(token)));
        return true;
    }
    if up == "ACCESSES" {
        show_rows(&rt.block_on(resolver.api().granted_accesses(token)));
        return true;
    }
    if let Some(rest) = strip_prefix_ci(line, "GRANT ") {
        match json_arg(rest) {
            Some(payload) => show_result(rt.block_on(resolver.api().grant_access(token, &payload))),
            None => println!("usage: grant <json>  e.g. grant {{\"doctor_id\": 5}}"),
        }
        return true;
    }
    if let Some(rest) = strip_prefix_ci(line, "REVOKE ") {
        match rest.parse::<i64>() {
            Ok(id) => show_result(rt.block_on(resolver.api().revoke_access(token, id))),
            Err(_) => println!("usage: revoke <permission-id>"),
        }
        return true;
    }
    if let Some(rest) = strip_prefix_ci(line, "UPDATE-INFO ") {
        match json_arg(rest) {
            Some(fields) => show_result(rt.block_on(resolver.api().update_patient_info(token, &fields))),
            None => println!("usage: update-info <json>"),
        }
        return true;
    }
    false
}

fn handle_doctor(rt: &tokio::runtime::Runtime, resolver: &SessionResolver, token: &str, line: &str) -> bool {
    let up = line.to_uppercase();
    if up == "PATIENTS" {
        show_rows(&rt.block_on(resolver.api().my_patients(token)));
        return true;
    }
    if let Some(rest) = strip_prefix_ci(line, "NEW-RECORD ") {
        let Some((id, body)) = rest.split_once(' ') else {
            println!("usage: new-record <patient-id> <json>");
            return true;
        };
        match (id.parse::<i64>(), json_arg(body)) {
            (Ok(patient_id), Some(record)) => {
                show_result(rt.block_on(resolver.api().create_medical_record(token, patient_id, &record)))
            }
            _ => println!("usage: new-record <patient-id> <json>"),
        }
        return true;
    }
    if let Some(rest) = strip_prefix_ci(line, "PRESCRIBE ") {
        match json_arg(rest) {
            Some(p) => show_result(rt.block_on(resolver.api().create_prescription(token, &p))),
            None => println!("usage: prescribe <json>"),
        }
        return true;
    }
    if let Some(rest) = strip_prefix_ci(line, "ORDER-TEST ") {
        match json_arg(rest) {
            Some(o) => show_result(rt.block_on(resolver.api().order_lab_test(token, &o))),
            None => println!("usage: order-test <json>"),
        }
        return true;
    }
    false
}

fn handle_laboratory(rt: &tokio::runtime::Runtime, resolver: &SessionResolver, token: &str, line: &str) -> bool {
    let up = line.to_uppercase();
    if up == "TESTS" {
        show_rows(&rt.block_on(resolver.api().pending_tests(token)));
        return true;
    }
    if let Some(rest) = strip_prefix_ci(line, "START ") {
        match rest.parse::<i64>() {
            Ok(id) => show_result(rt.block_on(resolver.api().start_test(token, id))),
            Err(_) => println!("usage: start <test-id>"),
        }
        return true;
    }
    if let Some(rest) = strip_prefix_ci(line, "COMPLETE ") {
        let Some((id, body)) = rest.split_once(' ') else {
            println!("usage: complete <test-id> <json>");
            return true;
        };
        match (id.parse::<i64>(), json_arg(body)) {
            (Ok(test_id), Some(results)) => {
                show_result(rt.block_on(resolver.api().complete_test(token, test_id, &results)))
            }
            _ => println!("usage: complete <test-id> <json>"),
        }
        return true;
    }
    false
}

fn handle_admin(rt: &tokio::runtime::Runtime, resolver: &SessionResolver, token: &str, line: &str) -> bool {
    let up = line.to_uppercase();
    if up == "STATS" {
        show_admin_stats(rt, resolver, token);
        return true;
    }
    if up == "USERS" {
        match rt.block_on(resolver.api().all_users(token)) {
            Ok(v) => show_rows(&adapters::unwrap_list(&v)),
            Err(e) => println!("error: {}", e.message()),
        }
        return true;
    }
    if up == "VALIDATIONS" {
        match rt.block_on(resolver.api().pending_validations(token)) {
            Ok(v) => show_rows(&adapters::unwrap_list(&v)),
            Err(e) => println!("error: {}", e.message()),
        }
        return true;
    }
    for (word, action) in [("APPROVE ", ValidationAction::Approve), ("REJECT ", ValidationAction::Reject)] {
        if let Some(rest) = strip_prefix_ci(line, word) {
            let parts: Vec<&str> = rest.split_whitespace().collect();
            let kind = parts.first().map(|k| k.to_lowercase());
            let kind = match kind.as_deref() {
                Some("doctor") | Some("doctors") => Some(ProfessionalKind::Doctor),
                Some("laboratory") | Some("laboratories") | Some("lab") => Some(ProfessionalKind::Laboratory),
                _ => None,
            };
            match (kind, parts.get(1).and_then(|s| s.parse::<i64>().ok())) {
                (Some(kind), Some(id)) => {
                    show_result(rt.block_on(resolver.api().validate_professional(token, kind, id, action)))
                }
                _ => println!("usage: {} <doctor|laboratory> <id>", word.trim().to_lowercase()),
            }
            return true;
        }
    }
    false
}

fn render_tab(rt: &tokio::runtime::Runtime, resolver: &SessionResolver, tab: Tab, token: &str) {
    match tab {
        Tab::Summary => {
            let s = resolver.session();
            println!("{} ({})", s.profile.display_name(), s.role);
            print_object(&serde_json::to_value(&s.profile).unwrap_or(Value::Null));
            println!("medical records on file: {}", resolver.records().len());
        }
        Tab::History => show_rows(resolver.records()),
        Tab::Access => {
            show_rows(&rt.block_on(resolver.api().granted_accesses(token)));
            println!("actions: grant <json> | revoke <id> | doctors");
        }
        Tab::Profile => {
            print_object(&serde_json::to_value(&resolver.session().profile).unwrap_or(Value::Null));
            println!("actions: update-profile <json> | update-info <json>");
        }
        Tab::Patients => show_rows(&rt.block_on(resolver.api().my_patients(token))),
        Tab::Consultations => {
            println!("actions: new-record <patient-id> <json> | prescribe <json> | order-test <json>")
        }
        Tab::Requests => {
            show_rows(&rt.block_on(resolver.api().pending_tests(token)));
            println!("actions: start <test-id>");
        }
        Tab::Results => {
            show_rows(&rt.block_on(resolver.api().pending_tests(token)));
            println!("actions: complete <test-id> <json>");
        }
        Tab::Dashboard => show_admin_stats(rt, resolver, token),
        Tab::Validations => {
            match rt.block_on(resolver.api().pending_validations(token)) {
                Ok(v) => show_rows(&adapters::unwrap_list(&v)),
                Err(e) => println!("error: {}", e.message()),
            }
            println!("actions: approve <doctor|laboratory> <id> | reject <doctor|laboratory> <id>");
        }
        Tab::Users => match rt.block_on(resolver.api().all_users(token)) {
            Ok(v) => show_rows(&adapters::unwrap_list(&v)),
            Err(e) => println!("error: {}", e.message()),
        },
    }
}

fn show_admin_stats(rt: &tokio::runtime::Runtime, resolver: &SessionResolver, token: &str) {
    // dashboard numbers are a nicety, not a gate
    match rt.block_on(resolver.api().admin_statistics(token)) {
        Ok(stats) => {
            println!("dashboard:");
            print_object(&stats);
        }
        Err(e) => println!("statistics unavailable: {}", e.message()),
    }
}

fn show_rows(rows: &[Value]) {
    if !print_list(rows) {
        let v = Value::Array(rows.to_vec());
        println!("{}", serde_json::to_string_pretty(&v).unwrap_or_else(|_| v.to_string()));
    }
}

fn show_result(result: crate::error::AppResult<Value>) {
    match result {
        Ok(v) => println!("{}", serde_json::to_string_pretty(&v).unwrap_or_else(|_| v.to_string())),
        Err(e) => println!("error: {}", e.message()),
    }
}

fn collect_registration(portal: Portal) -> RegistrationForm {
    let mut form = RegistrationForm {
        email: prompt_field("email"),
        password: prompt_field("password"),
        first_name: prompt_field("first name"),
        last_name: prompt_field("last name"),
        phone: prompt_field("phone"),
        ..RegistrationForm::default()
    };
    match portal {
        Portal::Patient => {
            form.date_of_birth = prompt_field("date of birth (YYYY-MM-DD)");
            form.gender = prompt_field("gender (M/F/O)");
        }
        Portal::Doctor => {
            form.license_number = prompt_field("license number");
            form.specialty = prompt_field("specialty");
            form.hospital = prompt_field("hospital");
        }
        Portal::Laboratory => {
            form.license_number = prompt_field("accreditation number");
        }
        Portal::Admin => {}
    }
    form
}

fn prompt_field(label: &str) -> String {
    print!("  {}: ", label);
    let _ = io::stdout().flush();
    let mut s = String::new();
    if io::stdin().read_line(&mut s).is_err() {
        return String::new();
    }
    s.trim().to_string()
}

fn json_arg(s: &str) -> Option<Value> {
    serde_json::from_str(s).ok()
}

fn strip_prefix_ci<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let head = line.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(line[prefix.len()..].trim())
    } else {
        None
    }
}

fn print_help(resolver: &SessionResolver, step: &AuthStep) {
    println!("global: help | theme | quit");
    if resolver.session().is_authenticated() {
        println!("session: status | tabs | open <tab> | records | update-profile <json> | logout");
        match resolver.session().role {
            r if r.is_patient_alias() => {
                println!("patient: doctors | accesses | grant <json> | revoke <id> | update-info <json>")
            }
            Role::Doctor => {
                println!("doctor: patients | new-record <patient-id> <json> | prescribe <json> | order-test <json>")
            }
            Role::Laboratory => println!("laboratory: tests | start <test-id> | complete <test-id> <json>"),
            Role::Admin => {
                println!("admin: stats | users | validations | approve <doctor|laboratory> <id> | reject <doctor|laboratory> <id>")
            }
            _ => println!("role could not be resolved; only logout is available"),
        }
        return;
    }
    match step {
        AuthStep::RoleSelection => println!("choose a portal: patient | doctor | laboratory | admin"),
        AuthStep::Login(_) => println!("login <email> <password> | register | back"),
        AuthStep::Register(_) => println!("submit | back"),
    }
}
