//! Script injected into every rewritten markup page.
//!
//! The page runs from an in-memory document in a same-origin frame, so it can
//! reach the host's tracking API through `window.parent`. When no host API is
//! attached the page still runs against an inert stub, which is what makes
//! standalone inspection of a package possible.

/// Host-side global the sandboxed page calls to swap in another package page.
pub const HOST_NAVIGATE_HOOK: &str = "_scormLoadPage";

/// Page-side function the link interceptor calls.
pub const PAGE_NAVIGATE_HOOK: &str = "_scormNavigate";

pub const API_BOOTSTRAP_SCRIPT: &str = r#"<script type="text/javascript">
(function(){
  "use strict";
  window.loadPage=function(){return true;};
  window.unloadPage=function(){return true;};
  window.doNavigation=function(){return true;};
  window.exitSCO=function(){return true;};
  window.goNext=function(){return true;};
  window.goPrev=function(){return true;};
  window.goHome=function(){return true;};

  var parentAPI = null;
  try {
    if (window.parent && window.parent.API) {
      parentAPI = window.parent.API;
    } else if (window.parent && window.parent.SCORM_API) {
      parentAPI = window.parent.SCORM_API;
    }
  } catch(e) {
    console.warn("Cannot access parent API:", e);
  }

  if (parentAPI) {
    window.API = parentAPI;
  } else {
    console.warn("Parent API not found, using stub");
    window.API = {
      LMSInitialize:function(p){return "true";},
      LMSFinish:function(p){return "true";},
      LMSGetValue:function(el){return "";},
      LMSSetValue:function(el,val){return "true";},
      LMSCommit:function(p){return "true";},
      LMSGetLastError:function(){return "0";},
      LMSGetErrorString:function(c){return "";},
      LMSGetDiagnostic:function(c){return "";}
    };
  }

  window.doLMSInitialize=function(){return window.API.LMSInitialize("");};
  window.doLMSFinish=function(){return window.API.LMSFinish("");};
  window.doLMSGetValue=function(e){return window.API.LMSGetValue(e);};
  window.doLMSSetValue=function(e,v){return window.API.LMSSetValue(e,v);};
  window.doLMSCommit=function(){return window.API.LMSCommit("");};
  window.doLMSGetLastError=function(){return window.API.LMSGetLastError();};
  window.doLMSGetErrorString=function(c){return window.API.LMSGetErrorString(c);};
  window.doLMSGetDiagnostic=function(c){return window.API.LMSGetDiagnostic(c);};
})();
</script>
"#;

pub const NAVIGATION_SCRIPT: &str = r#"<script type="text/javascript">
window._scormNavigate = function(href) {
  if (window.parent && window.parent._scormLoadPage) {
    window.parent._scormLoadPage(href);
    return false;
  }
  return true;
};
</script>
"#;

/// Full block inserted at the top of `<head>`.
pub fn injection_block() -> String {
    format!("{API_BOOTSTRAP_SCRIPT}{NAVIGATION_SCRIPT}")
}

#[cfg(test)]
#[path = "tests/bootstrap_tests.rs"]
mod tests;
