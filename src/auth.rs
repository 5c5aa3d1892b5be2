use anyhow::{Result, bail};
use std::io::{self, BufRead, IsTerminal};
use zeroize::Zeroizing;

pub const PASSPHRASE_ENV: &str = "KEYSEAL_PASSPHRASE";

/// Passphrase for opening an existing keystore.
///
/// Empty passphrases are passed through; the keystore decides whether they
/// match.
pub fn read_passphrase() -> Result<Zeroizing<String>> {
    //  KEYSEAL_PASSPHRASE="supersecret" keyseal show
    if let Ok(pw) = std::env::var(PASSPHRASE_ENV) {
        return Ok(Zeroizing::new(pw));
    }

    //  echo "supersecret" | keyseal show
    if !io::stdin().is_terminal() {
        let mut buf = Zeroizing::new(String::new());
        io::stdin().read_line(&mut buf)?;
        trim_newline(&mut buf);
        return Ok(buf);
    }

    Ok(Zeroizing::new(rpassword::prompt_password("Passphrase: ")?))
}

/// Passphrase for a new keystore, confirmed when entered interactively.
pub fn read_new_passphrase_with_confirmation() -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var(PASSPHRASE_ENV) {
        let pw = Zeroizing::new(pw);
        if pw.is_empty() {
            bail!("passphrase cannot be empty");
        }
        return Ok(pw);
    }

    if !io::stdin().is_terminal() {
        let stdin = io::stdin();
        let mut handle = stdin.lock();

        let mut pw1 = Zeroizing::new(String::new());
        let mut pw2 = Zeroizing::new(String::new());

        handle.read_line(&mut pw1)?;
        handle.read_line(&mut pw2)?;

        trim_newline(&mut pw1);
        trim_newline(&mut pw2);

        return confirm(pw1, &pw2);
    }

    let pw1 = Zeroizing::new(rpassword::prompt_password("New passphrase: ")?);
    let pw2 = Zeroizing::new(rpassword::prompt_password("Confirm passphrase: ")?);

    confirm(pw1, &pw2)
}

fn confirm(pw1: Zeroizing<String>, pw2: &str) -> Result<Zeroizing<String>> {
    if pw1.is_empty() {
        bail!("passphrase cannot be empty");
    }

    if pw1.as_str() != pw2 {
        bail!("passphrases do not match");
    }

    Ok(pw1)
}

fn trim_newline(s: &mut String) {
    while s.ends_with('\n') || s.ends_with('\r') {
        s.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trim_newline_strips_line_endings_only() {
        let mut s = String::from("pass word \r\n");
        trim_newline(&mut s);
        assert_eq!(s, "pass word ");
    }

    #[test]
    fn confirm_checks_match_and_emptiness() {
        assert!(confirm(Zeroizing::new("a".into()), "a").is_ok());
        assert!(confirm(Zeroizing::new("a".into()), "b").is_err());
        assert!(confirm(Zeroizing::new(String::new()), "").is_err());
    }
}
