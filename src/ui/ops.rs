//! ui::ops
//!
//! Higher-level conversations with the operator built on [`Display`].

use super::display::{Answer, Display, DisplayError};
use super::text::{separate_list_input, summarize_domain_list};

/// Ask the operator to choose one of several plugins.
///
/// `candidates` pairs each plugin name with a short description. Returns the
/// index of the chosen candidate, or `None` if the operator cancelled or there
/// was nothing to choose from.
pub fn choose_plugin(
    display: &dyn Display,
    question: &str,
    candidates: &[(String, String)],
) -> Result<Option<usize>, DisplayError> {
    if candidates.is_empty() {
        return Ok(None);
    }
    let choices: Vec<String> = candidates
        .iter()
        .map(|(name, description)| format!("{} ({})", description, name))
        .collect();
    Ok(display.menu(question, &choices)?.ok())
}

/// Ask the operator which domains to request a certificate for.
///
/// When an installer found names in the server configuration they are offered
/// as a checklist; otherwise (or if the list is empty) the operator types them.
/// Cancelling yields an empty list.
pub fn choose_names(
    display: &dyn Display,
    installer_names: Option<&[String]>,
) -> Result<Vec<String>, DisplayError> {
    let Some(names) = installer_names else {
        return get_valid_domains(display);
    };

    if names.is_empty() {
        display.notification(
            "No names were found in your configuration files.\n\
             You should specify ServerNames in your config files in order to allow \
             for accurate installation of your certificate.\n\
             If you do use the default vhost, you may specify the name manually.",
            false,
        )?;
        return get_valid_domains(display);
    }

    let mut sorted = names.to_vec();
    sorted.sort();
    match display.checklist(
        "Which names would you like to activate HTTPS for?",
        &sorted,
    )? {
        Answer::Ok(chosen) => Ok(chosen),
        Answer::Cancel => Ok(Vec::new()),
    }
}

fn get_valid_domains(display: &dyn Display) -> Result<Vec<String>, DisplayError> {
    match display.input("Please enter in your domain name(s) (comma and/or space separated)")? {
        Answer::Ok(text) => Ok(separate_list_input(&text)),
        Answer::Cancel => Ok(Vec::new()),
    }
}

/// Ask for the email address used for account registration.
pub fn get_email(display: &dyn Display) -> Result<Option<String>, DisplayError> {
    let answer = display.input(
        "Enter email address (used for urgent notices and lost key recovery)",
    )?;
    Ok(answer.ok().map(|s| s.trim().to_string()).filter(|s| !s.is_empty()))
}

/// Ask the operator which stored account to use.
pub fn choose_account(
    display: &dyn Display,
    labels: &[String],
) -> Result<Option<usize>, DisplayError> {
    Ok(display.menu("Please choose an account", labels)?.ok())
}

/// Ask whether the operator agrees to the CA's terms of service.
pub fn agree_to_terms(display: &dyn Display, terms_url: &str) -> Result<bool, DisplayError> {
    display.yesno(
        &format!(
            "Please read the Terms of Service at {}. You must agree in order to \
             register with the certificate authority.",
            terms_url
        ),
        "Agree",
        "Cancel",
        None,
    )
}

/// Ask whether plain HTTP should be redirected to HTTPS.
///
/// Returns `true` for "Secure" (redirect everything).
pub fn redirect_by_default(display: &dyn Display) -> Result<bool, DisplayError> {
    display.yesno(
        "Please choose whether HTTPS access is required or optional.\n\
         Easy: allow both HTTP and HTTPS access to these sites\n\
         Secure: make all requests redirect to secure HTTPS access",
        "Secure",
        "Easy",
        Some(false),
    )
}

/// Ask before reverting installer checkpoints. Defaults to no.
pub fn confirm_rollback(display: &dyn Display, checkpoints: usize) -> Result<bool, DisplayError> {
    let noun = if checkpoints == 1 { "checkpoint" } else { "checkpoints" };
    display.yesno(
        &format!(
            "Revert the last {} configuration {}? Changes made since then will be lost.",
            checkpoints, noun
        ),
        "Revert",
        "Cancel",
        Some(false),
    )
}

/// Tell the operator the certificate is live.
pub fn success_installation(display: &dyn Display, domains: &[String]) -> Result<(), DisplayError> {
    let sites: Vec<String> = domains.iter().map(|d| format!("https://{}", d)).collect();
    display.notification(
        &format!(
            "Congratulations! You have successfully enabled {}!\n\n\
             You should test your configuration at:\n{}",
            summarize_domain_list(domains),
            sites.join("\n")
        ),
        false,
    )
}
