use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters `encodeURIComponent` leaves alone.
const COOKIE_VALUE: &AsciiSet = &NON_ALPHANUMERIC
  .remove(b'-')
  .remove(b'_')
  .remove(b'.')
  .remove(b'!')
  .remove(b'~')
  .remove(b'*')
  .remove(b'\'')
  .remove(b'(')
  .remove(b')');

/// The `Set-Cookie` value storing an id token as a session cookie.
///
/// The token is percent-encoded. `Secure` is set unless the request came in
/// over plain `http`.
pub fn set_id_token_cookie(protocol: &str, id_token: &str) -> String {
  let mut cookie = format!(
    "idToken={}; Path=/; SameSite=Lax",
    utf8_percent_encode(id_token, COOKIE_VALUE)
  );
  if protocol.trim_end_matches(':') == "https" {
    cookie.push_str("; Secure");
  }
  cookie
}
